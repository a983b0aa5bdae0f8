//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (locality check, HTTP/1.1 parse, Host check)
//!     → [routing parses the path]
//!     → [dispatch runs the formatter on the owner thread]
//!     → response.rs (route → JSON payload → response)
//!     → Send to client, close connection
//! ```

pub mod response;
pub mod server;

pub use response::{empty_response, json_response, render, EMPTY_PAYLOAD};
pub use server::{Dropped, ReportHttpServer};
