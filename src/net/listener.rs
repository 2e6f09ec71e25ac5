//! TCP acceptor.
//!
//! # Responsibilities
//! - Bind and listen on the configured address with a fixed backlog
//! - Accept incoming TCP connections forever
//! - Pick a backend per connection and spawn its relay without waiting
//! - Optionally bound concurrent sessions via semaphore
//! - Survive accept errors

use std::convert::Infallible;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::Instrument;

use crate::config::ListenerConfig;
use crate::load_balancer::BackendPool;
use crate::net::connection::ConnectionTracker;
use crate::net::relay::{self, RelayPolicy};

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Error type for listener setup. All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddrParseError,
    },
    #[error("Failed to create socket: {0}")]
    Socket(#[source] std::io::Error),
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to listen on {address}: {source}")]
    Listen {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A bound listening socket that dispatches every client to its own relay.
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore to limit concurrent sessions, when configured.
    connection_limit: Option<Arc<Semaphore>>,
    /// Live session accounting.
    tracker: ConnectionTracker,
}

impl Listener {
    /// Bind and listen on the configured address.
    pub fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let address: SocketAddr = config.bind_address.parse().map_err(|source| {
            ListenerError::Address {
                address: config.bind_address.clone(),
                source,
            }
        })?;

        let socket = if address.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Socket)?;
        socket.set_reuseaddr(true).map_err(ListenerError::Socket)?;

        socket
            .bind(address)
            .map_err(|source| ListenerError::Bind { address, source })?;
        let inner = socket
            .listen(config.backlog)
            .map_err(|source| ListenerError::Listen { address, source })?;

        tracing::info!(
            address = %inner.local_addr().unwrap_or(address),
            backlog = config.backlog,
            max_connections = ?config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner,
            connection_limit: config.max_connections.map(|n| Arc::new(Semaphore::new(n))),
            tracker: ConnectionTracker::new(),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Handle for observing live sessions.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Get current available session slots, if a cap is configured.
    pub fn available_permits(&self) -> Option<usize> {
        self.connection_limit.as_ref().map(|s| s.available_permits())
    }

    /// Accept connections forever, one relay task per client.
    ///
    /// Never returns; the process is stopped externally.
    pub async fn serve(self, pool: Arc<BackendPool>, policy: Arc<RelayPolicy>) -> Infallible {
        loop {
            // Acquire permit first (backpressure)
            let permit = match &self.connection_limit {
                Some(limit) => Arc::clone(limit).acquire_owned().await.ok(),
                None => None,
            };

            match self.inner.accept().await {
                Ok((stream, peer_addr)) => {
                    self.dispatch(stream, peer_addr, &pool, &policy, permit);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    }

    fn dispatch(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
        pool: &BackendPool,
        policy: &Arc<RelayPolicy>,
        permit: Option<OwnedSemaphorePermit>,
    ) {
        let endpoint = pool.select_next().clone();
        let guard = self.tracker.track();
        let policy = Arc::clone(policy);

        let span = tracing::info_span!(
            "session",
            id = %guard.id(),
            peer = %peer_addr,
            backend = %endpoint,
        );
        tracing::debug!(parent: &span, "Connection accepted");

        tokio::spawn(
            async move {
                match relay::run(stream, &endpoint, &policy).await {
                    Ok(stats) => tracing::debug!(
                        bytes_to_backend = stats.bytes_to_backend,
                        bytes_to_client = stats.bytes_to_client,
                        exchanges = stats.exchanges,
                        "Session closed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Backend unreachable, client closed"),
                }
                // Sockets are already closed; release the slot last.
                drop(guard);
                drop(permit);
            }
            .instrument(span),
        );
    }
}
