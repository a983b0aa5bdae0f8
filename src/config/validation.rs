//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts, capacities and intervals > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every range constraint and report all violations.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let service = &config.service;

    if service.bind.max_attempts == 0 {
        errors.push(ValidationError::new("bind.max_attempts", "must be at least 1"));
    }
    if service.dispatch.queue_capacity == 0 {
        errors.push(ValidationError::new("dispatch.queue_capacity", "must be at least 1"));
    }
    if service.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be at least 1"));
    }
    if service.limits.read_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "limits.read_timeout_secs",
            "must be at least 1",
        ));
    }
    if config.owner.tick_ms == 0 {
        errors.push(ValidationError::new("owner.tick_ms", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
