//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the backend pool, then bind the listener
//! - Hand back a ready-to-serve proxy
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig};
use crate::load_balancer::{BackendPool, PoolError};
use crate::net::connection::ConnectionTracker;
use crate::net::{Listener, ListenerError, RelayPolicy};

/// Fatal error raised before the accept loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// A bound proxy that has not started accepting yet.
pub struct Proxy {
    listener: Listener,
    pool: Arc<BackendPool>,
    policy: Arc<RelayPolicy>,
}

impl Proxy {
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub fn tracker(&self) -> ConnectionTracker {
        self.listener.tracker()
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }

    /// Run the accept loop. Never returns.
    pub async fn serve(self) -> Infallible {
        self.listener.serve(self.pool, self.policy).await
    }
}

/// Validate `config`, build the pool and bind the listener, in that order.
pub fn start(config: &ProxyConfig) -> Result<Proxy, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let pool = BackendPool::new(config.endpoints())?;
    let policy = RelayPolicy::from_config(config);
    let listener = Listener::bind(&config.listener)?;

    tracing::info!(
        backends = pool.len(),
        mode = ?policy.mode,
        buffer_size = policy.buffer_size,
        "Proxy initialised"
    );

    Ok(Proxy {
        listener,
        pool: Arc::new(pool),
        policy: Arc::new(policy),
    })
}
