//! Metrics collection.
//!
//! # Metrics
//! - `report_server_requests_total` (counter): handled requests by outcome
//! - `report_server_rejections_total` (counter): dropped requests by reason
//! - `report_server_bind_attempts_total` (counter): listener bind attempts
//!
//! Nothing is exported unless the host installs a `metrics` recorder.

use crate::security::Rejection;

/// Terminal state of a request that passed the security checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Completed,
    RouteMiss,
    Cancelled,
    Faulted,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::RouteMiss => "route_miss",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        }
    }
}

pub fn record_request(outcome: RequestOutcome) {
    ::metrics::counter!("report_server_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_rejection(reason: Rejection) {
    ::metrics::counter!("report_server_rejections_total", "reason" => reason.as_str()).increment(1);
}

pub fn record_bind_attempt() {
    ::metrics::counter!("report_server_bind_attempts_total").increment(1);
}
