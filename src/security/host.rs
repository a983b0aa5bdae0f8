//! Host header allow-list.
//!
//! # Design Decisions
//! - Exact, case-sensitive comparison against `host:port` strings
//! - Missing or non-UTF-8 Host header never matches
//!
//! The allow-list defends against DNS rebinding: a remote page whose name
//! was re-pointed at 127.0.0.1 still sends its own name in `Host`.

use axum::http::{header, HeaderMap};

/// The set of Host header values a request may carry.
#[derive(Debug, Clone)]
pub struct HostAllowList {
    allowed: Vec<String>,
}

impl HostAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `host` is one of the allowed values.
    pub fn allows(&self, host: &str) -> bool {
        self.allowed.iter().any(|h| h == host)
    }

    /// Whether the request's Host header is allowed.
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(|h| self.allows(h))
            .unwrap_or(false)
    }

    pub fn hosts(&self) -> &[String] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn allow_list() -> HostAllowList {
        HostAllowList::new(["localhost:38000", "127.0.0.1:38000"])
    }

    fn headers(host: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(host) = host {
            headers.insert(header::HOST, HeaderValue::from_static(host));
        }
        headers
    }

    #[test]
    fn accepts_bound_hosts() {
        let list = allow_list();
        assert!(list.matches(&headers(Some("localhost:38000"))));
        assert!(list.matches(&headers(Some("127.0.0.1:38000"))));
    }

    #[test]
    fn rejects_everything_else() {
        let list = allow_list();
        for host in [
            "evil.example:38000",
            "localhost",
            "127.0.0.1",
            "localhost:38001",
            "LOCALHOST:38000",
            "[::1]:38000",
            " localhost:38000",
        ] {
            assert!(!list.matches(&headers(Some(host))), "{host} should be rejected");
        }
        assert!(!list.matches(&headers(None)));
    }
}
