//! Retry logic for listener startup.
//!
//! # Responsibilities
//! - Retry an operation while it fails transiently (port still held)
//! - Fixed delay between attempts, bounded attempt count
//! - Propagate any other failure immediately
//!
//! # Design Decisions
//! - No jitter or backoff: the only contender is our own previous instance
//! - The last error is returned unchanged when attempts run out

use std::future::Future;
use std::time::Duration;

use crate::config::BindConfig;
use crate::net::ListenerError;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl From<&BindConfig> for RetryPolicy {
    fn from(config: &BindConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&BindConfig::default())
    }
}

/// Run `op` until it succeeds, fails fatally, or exhausts the policy.
/// `op` receives the 1-based attempt number.
pub async fn retry_transient<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ListenerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ListenerError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Listener bound after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Listener port still in use, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
