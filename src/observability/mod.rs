//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Each request runs in a span carrying a UUID request id
//! - Security rejections are counted but only traced, never logged as errors
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
