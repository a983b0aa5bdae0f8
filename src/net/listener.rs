//! Loopback TCP listener.
//!
//! # Responsibilities
//! - Bind the loopback sockets for the service port
//! - Accept the next connection from whichever socket has one
//! - Classify bind failures as transient (port still held) or fatal

use futures_util::future::select_all;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] io::Error),
}

impl ListenerError {
    /// Whether the failure is the port still being held, which clears up on
    /// its own once the previous owner releases it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}

/// One socket address to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindTarget {
    pub addr: SocketAddr,
    /// Optional targets are skipped when the address family is unavailable.
    pub required: bool,
}

/// `127.0.0.1:port` (required) and `[::1]:port` (when IPv6 loopback exists),
/// covering both the `127.0.0.1` and `localhost` names.
pub fn loopback_targets(port: u16) -> Vec<BindTarget> {
    vec![
        BindTarget {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            required: true,
        },
        BindTarget {
            addr: SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), port),
            required: false,
        },
    ]
}

/// A set of bound loopback sockets accepted as one.
#[derive(Debug)]
pub struct Listener {
    sockets: Vec<TcpListener>,
}

impl Listener {
    /// Bind every target. Any failure drops the sockets bound so far.
    pub async fn bind(targets: &[BindTarget]) -> Result<Self, ListenerError> {
        let mut sockets = Vec::with_capacity(targets.len());
        for target in targets {
            match TcpListener::bind(target.addr).await {
                Ok(socket) => sockets.push(socket),
                Err(source) if !target.required && source.kind() != io::ErrorKind::AddrInUse => {
                    tracing::debug!(
                        address = %target.addr,
                        error = %source,
                        "Optional listener address unavailable"
                    );
                }
                Err(source) => {
                    return Err(ListenerError::Bind {
                        addr: target.addr,
                        source,
                    })
                }
            }
        }

        if sockets.is_empty() {
            return Err(ListenerError::Bind {
                addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
                source: io::Error::new(io::ErrorKind::InvalidInput, "no bind targets"),
            });
        }

        let listener = Self { sockets };
        tracing::info!(addresses = ?listener.local_addrs(), "Listener bound");
        Ok(listener)
    }

    /// Accept the next connection on any socket.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let pending = self.sockets.iter().map(|s| Box::pin(s.accept()));
        let (accepted, _, _) = select_all(pending).await;
        let (stream, peer) = accepted.map_err(ListenerError::Accept)?;
        tracing::debug!(peer_addr = %peer, "Connection accepted");
        Ok((stream, peer))
    }

    /// Addresses actually bound.
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.sockets
            .iter()
            .filter_map(|s| s.local_addr().ok())
            .collect()
    }
}
