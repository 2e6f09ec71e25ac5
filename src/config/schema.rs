//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::load_balancer::backend::BackendEndpoint;

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog, connection cap).
    pub listener: ListenerConfig,

    /// Ordered backend pool. Selection rotates through it in this order.
    pub backends: Vec<BackendConfig>,

    /// Relay behaviour.
    pub relay: RelayConfig,

    /// Dial and read deadlines.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: vec![
                BackendConfig::new("127.0.0.1", 8081),
                BackendConfig::new("127.0.0.1", 8082),
                BackendConfig::new("127.0.0.1", 8083),
            ],
            relay: RelayConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Backend endpoints in configured order.
    pub fn endpoints(&self) -> Vec<BackendEndpoint> {
        self.backends
            .iter()
            .map(|b| BackendEndpoint::new(b.host.clone(), b.port))
            .collect()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Pending-connection queue length passed to listen(2).
    pub backlog: u32,

    /// Optional cap on concurrent sessions. Unbounded when absent.
    pub max_connections: Option<usize>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            backlog: 10,
            max_connections: None,
        }
    }
}

/// A single backend server entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// Hostname or IP address.
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl BackendConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// How bytes are pumped between client and backend.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// One backend read per client read, strict request/response alternation.
    #[default]
    Lockstep,
    /// Two independent copy directions; either side closing ends both.
    Duplex,
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    pub mode: RelayMode,

    /// Maximum bytes moved per read.
    pub buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::Lockstep,
            buffer_size: 4096,
        }
    }
}

/// Deadline configuration. Absent values mean "wait forever".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend dial deadline in milliseconds.
    pub connect_ms: Option<u64>,

    /// Deadline for each client read in milliseconds. Elapsing ends the session.
    pub client_read_ms: Option<u64>,

    /// Deadline for each backend read in milliseconds. Elapsing skips the
    /// reply for that exchange only.
    pub backend_read_ms: Option<u64>,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        self.connect_ms.map(Duration::from_millis)
    }

    pub fn client_read(&self) -> Option<Duration> {
        self.client_read_ms.map(Duration::from_millis)
    }

    pub fn backend_read(&self) -> Option<Duration> {
        self.backend_read_ms.map(Duration::from_millis)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
