//! Listener state as observed from the owner thread.

use std::net::SocketAddr;

/// ```text
/// Stopped → Starting (bind retries) → Running → Stopped
///                 └──────────────→ Faulted
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    /// Binding; `attempt` counts from 1 (0 before the first try).
    Starting { attempt: u32 },
    /// Accepting connections on these sockets.
    Running { addrs: Vec<SocketAddr> },
    /// Startup failed; the service is not running.
    Faulted(String),
}

impl ListenerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Whether the worker has reached a state it will not leave on its own.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Starting { .. })
    }
}
