//! Concurrent fan-out execution.
//!
//! This crate launches a fixed set of independent workers and waits for all
//! of them:
//! - `Worker` - One unit of work, identified by its index
//! - `FanOut` - Spawn, join, and report
//! - `FanOutError` - The single failure class a fan-out can produce

mod error;
mod scheduler;
mod worker;

pub use error::*;
pub use scheduler::*;
pub use worker::*;
