//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Listener startup:
//!     → retries.rs (bind; on port-in-use wait and retry, else fail)
//! ```
//!
//! # Design Decisions
//! - Only the port-in-use bind failure is retryable
//! - Bounded attempts: exhausting them leaves the service stopped

pub mod retries;

pub use retries::{retry_transient, RetryPolicy};
