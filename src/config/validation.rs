//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject an empty backend pool before any selector is built
//! - Validate value ranges (ports, backlog, buffer size, deadlines)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address {0:?}")]
    BindAddress(String),
    #[error("listener backlog must be greater than zero")]
    ZeroBacklog,
    #[error("listener max_connections must be greater than zero when set")]
    ZeroMaxConnections,
    #[error("at least one backend is required")]
    NoBackends,
    #[error("backend #{index} has an empty host")]
    EmptyHost { index: usize },
    #[error("backend #{index} ({host}) has port 0")]
    ZeroPort { index: usize, host: String },
    #[error("relay buffer_size must be greater than zero")]
    ZeroBufferSize,
    #[error("timeouts.{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
    if config.listener.max_connections == Some(0) {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for (index, backend) in config.backends.iter().enumerate() {
        if backend.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost { index });
        }
        if backend.port == 0 {
            errors.push(ValidationError::ZeroPort {
                index,
                host: backend.host.clone(),
            });
        }
    }

    if config.relay.buffer_size == 0 {
        errors.push(ValidationError::ZeroBufferSize);
    }
    if config.timeouts.connect_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout("connect_ms"));
    }
    if config.timeouts.client_read_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout("client_read_ms"));
    }
    if config.timeouts.backend_read_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout("backend_read_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
