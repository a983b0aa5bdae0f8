//! Loopback origin check.

use std::net::{IpAddr, SocketAddr};

/// Whether a peer connected over the loopback interface.
pub fn is_local_peer(peer: SocketAddr) -> bool {
    is_loopback_ip(peer.ip())
}

fn is_loopback_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
    }
}
