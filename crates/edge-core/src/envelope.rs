//! HTTP-style envelope for hosts that front workloads with a gateway.

use std::collections::HashMap;

use http::StatusCode;
use serde::Serialize;

use crate::response::WorkloadResponse;

/// Gateway-shaped wrapper around a JSON-encoded [`WorkloadResponse`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// JSON body.
    pub body: String,
}

impl HostEnvelope {
    /// The status code as a typed value.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl WorkloadResponse {
    /// Wrap the response: 200 when completed, 500 when failed.
    pub fn into_envelope(self) -> HostEnvelope {
        let status = if self.is_completed() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let mut headers = HashMap::new();
        headers.insert(
            http::header::CONTENT_TYPE.as_str().to_string(),
            "application/json".to_string(),
        );

        HostEnvelope {
            status_code: status.as_u16(),
            headers,
            body: self.to_json(),
        }
    }
}
