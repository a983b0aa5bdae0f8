//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the report
//! server. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed port the service listens on.
pub const DEFAULT_PORT: u16 = 38000;

/// Root configuration for the report server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Settings consumed by the background listener and dispatcher.
    #[serde(flatten)]
    pub service: ServiceConfig,

    /// Owner-thread loop settings (binary only).
    pub owner: OwnerConfig,

    /// Where the binary loads reports from.
    pub reports: ReportsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Everything `ReportServer` needs to run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listening port. Not read from config files: the service always uses
    /// [`DEFAULT_PORT`] unless overridden in code.
    #[serde(skip)]
    pub port: u16,

    /// Bind retry policy.
    pub bind: BindConfig,

    /// Cross-thread queue settings.
    pub dispatch: DispatchConfig,

    /// Per-request limits.
    pub limits: LimitsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: BindConfig::default(),
            dispatch: DispatchConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Same configuration on a different port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The `host:port` strings a request's Host header may carry.
    pub fn allowed_hosts(&self) -> [String; 2] {
        [
            format!("localhost:{}", self.port),
            format!("127.0.0.1:{}", self.port),
        ]
    }
}

/// Listener bind retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BindConfig {
    /// Total bind attempts before giving up.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_delay_ms: 250,
        }
    }
}

impl BindConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Dispatch queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Capacity of the channel between the accept thread and the owner thread.
    pub queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { queue_capacity: 16 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body that is buffered; bigger requests are dropped.
    pub max_body_bytes: usize,

    /// Deadline for receiving a request's headers, and again for its body.
    /// The wait on the owner thread is not bounded by it.
    pub read_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            read_timeout_secs: 30,
        }
    }
}

impl LimitsConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Owner-thread loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OwnerConfig {
    /// Interval between queue drains in milliseconds.
    pub tick_ms: u64,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self { tick_ms: 16 }
    }
}

/// Report source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory of `*.json` report documents.
    pub directory: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("reports"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "build_report_server=info".to_string(),
        }
    }
}
