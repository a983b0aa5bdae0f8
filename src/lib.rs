//! Local build-report query service.
//!
//! Serves an in-memory report object graph over HTTP on the loopback
//! interface, while every read of report data happens on the single thread
//! that owns it.
//!
//! ```text
//!   listener thread                                 owner thread
//!  ┌───────────────────────────────────────┐       ┌──────────────────────┐
//!  │ net::Listener (bind with retry)       │       │                      │
//!  │   → security (loopback, Host header)  │       │  OwnerPump::drain    │
//!  │   → routing::parse_route              │ ────▶ │   → http::response   │
//!  │   → dispatch::Dispatcher (wait)       │ ◀──── │     (ReportStore)    │
//!  │   → write JSON, close                 │       │                      │
//!  └───────────────────────────────────────┘       └──────────────────────┘
//! ```

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod report;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::{ServerConfig, ServiceConfig};
pub use dispatch::OwnerPump;
pub use lifecycle::{ListenerState, ReportServer, ServiceError};
pub use report::{Appendix, BuildReport, ReportStore};
pub use routing::ReportHandle;
