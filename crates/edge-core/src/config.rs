//! Fan-out plan configuration.

use serde::{Deserialize, Serialize};

/// Number of concurrent workers a fixed plan launches.
pub const DEFAULT_WORKERS: usize = 10;

/// Number of iterations each worker performs in a fixed plan.
pub const DEFAULT_ITERATIONS: u32 = 100;

/// Shape of a fan-out: how many workers, how many iterations each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutPlan {
    /// Worker count. Workers are indexed `0..workers`.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Iterations per worker, numbered `1..=iterations`.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

impl FanOutPlan {
    /// The plan every invocation of the counter workload runs.
    pub fn fixed() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Create a plan with explicit counts.
    pub fn new(workers: usize, iterations: u32) -> Self {
        Self {
            workers,
            iterations,
        }
    }

    /// Total number of lines a successful run emits.
    pub fn total_lines(&self) -> u64 {
        self.workers as u64 * u64::from(self.iterations)
    }
}

impl Default for FanOutPlan {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_plan() {
        let plan = FanOutPlan::fixed();
        assert_eq!(plan.workers, 10);
        assert_eq!(plan.iterations, 100);
        assert_eq!(plan.total_lines(), 1000);
    }

    #[test]
    fn test_default_is_fixed() {
        assert_eq!(FanOutPlan::default(), FanOutPlan::fixed());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let plan: FanOutPlan = serde_json::from_str(r#"{"workers": 3}"#).unwrap();
        assert_eq!(plan, FanOutPlan::new(3, 100));
    }

    #[test]
    fn test_empty_plan_has_no_lines() {
        assert_eq!(FanOutPlan::new(0, 100).total_lines(), 0);
        assert_eq!(FanOutPlan::new(4, 0).total_lines(), 0);
    }
}
