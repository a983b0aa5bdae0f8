//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! start (service.rs, owner thread):
//!     new Shutdown → dispatch channel → spawn listener thread → return pump
//!
//! listener thread (supervisor.rs):
//!     bind with retry → accept loop → exit on shutdown
//!
//! stop (service.rs, owner thread):
//!     trigger Shutdown → listener drops sockets → join thread
//! ```
//!
//! # Design Decisions
//! - One shutdown source per running instance, used only for shutdown
//! - Start/stop state lives in `ReportServer`, touched only by its owner
//! - Stop is synchronous: no thread or half-written response outlives it

pub mod service;
pub mod shutdown;
pub mod state;
pub mod supervisor;

pub use service::{ReportServer, ServiceError};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::ListenerState;
