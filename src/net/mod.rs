//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Bind (listener.rs): 127.0.0.1:<port> + [::1]:<port> when available
//!     → accept from any socket, one connection at a time
//!     → hand off to the HTTP layer (security, routing, dispatch)
//! ```
//!
//! # Design Decisions
//! - Loopback addresses only; nothing listens on external interfaces
//! - Port-in-use bind failures are reported as transient for the retry layer

pub mod listener;

pub use listener::{loopback_targets, BindTarget, Listener, ListenerError};
