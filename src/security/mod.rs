//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection:
//!     → locality.rs (peer must be loopback)
//! Parsed request:
//!     → host.rs (Host header must be an exact allow-listed host:port)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Fail closed: any failed check drops the request
//! - Silent: dropped requests get no response and no error log
//! - No trust in client input

pub mod host;
pub mod locality;

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub use host::HostAllowList;
pub use locality::is_local_peer;

/// Why a request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The peer is not on the loopback interface.
    NonLocalPeer,
    /// The Host header is missing or not allow-listed.
    DisallowedHost,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonLocalPeer => "non_local_peer",
            Self::DisallowedHost => "disallowed_host",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Rejection {}

/// Both security checks, applied in order.
#[derive(Debug, Clone)]
pub struct SecurityFilter {
    hosts: HostAllowList,
}

impl SecurityFilter {
    pub fn new(hosts: HostAllowList) -> Self {
        Self { hosts }
    }

    /// Connection-level check, before any bytes are read.
    pub fn check_peer(&self, peer: SocketAddr) -> Result<(), Rejection> {
        if is_local_peer(peer) {
            Ok(())
        } else {
            Err(Rejection::NonLocalPeer)
        }
    }

    /// Request-level check on the parsed headers.
    pub fn check_host(&self, headers: &HeaderMap) -> Result<(), Rejection> {
        if self.hosts.matches(headers) {
            Ok(())
        } else {
            Err(Rejection::DisallowedHost)
        }
    }

    pub fn allowed_hosts(&self) -> &[String] {
        self.hosts.hosts()
    }
}
