//! Per-session byte relay between a client and its backend.
//!
//! # Responsibilities
//! - Dial the selected backend (fail fast, no retry, no fallback)
//! - Pump bytes in lockstep or duplex mode until the session ends
//! - Release both sockets exactly once, on every exit path
//!
//! # Lockstep contract
//! Each client read is followed by exactly one backend read. Only a failed
//! or empty client read ends the loop; a failed or empty backend read just
//! means nothing is forwarded to the client for that exchange. A client that
//! disconnects while its backend is still silent ends the session at once.

use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{ProxyConfig, RelayMode};
use crate::load_balancer::BackendEndpoint;
use crate::resilience::timeouts::with_deadline;

/// Error type for a relay session.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Backend could not be reached; the client has been closed.
    #[error("failed to connect to backend {endpoint}: {source}")]
    Dial {
        endpoint: BackendEndpoint,
        #[source]
        source: io::Error,
    },
}

/// How a session moves bytes and how long it waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPolicy {
    pub mode: RelayMode,
    pub buffer_size: usize,
    pub connect_timeout: Option<Duration>,
    /// Per-read deadlines apply to lockstep reads only. Duplex mode waits
    /// indefinitely.
    pub client_read_timeout: Option<Duration>,
    pub backend_read_timeout: Option<Duration>,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            mode: RelayMode::Lockstep,
            buffer_size: 4096,
            connect_timeout: None,
            client_read_timeout: None,
            backend_read_timeout: None,
        }
    }
}

impl RelayPolicy {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            mode: config.relay.mode,
            buffer_size: config.relay.buffer_size,
            connect_timeout: config.timeouts.connect(),
            client_read_timeout: config.timeouts.client_read(),
            backend_read_timeout: config.timeouts.backend_read(),
        }
    }
}

/// Byte counts for one finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub bytes_to_backend: u64,
    pub bytes_to_client: u64,
    /// Client chunks handled (lockstep only).
    pub exchanges: u64,
}

/// Run one session: dial `endpoint`, relay until the client leaves, close both.
///
/// `client` is consumed; it is dropped (closed) on every return path,
/// including a failed dial.
pub async fn run(
    client: TcpStream,
    endpoint: &BackendEndpoint,
    policy: &RelayPolicy,
) -> Result<RelayStats, RelayError> {
    let mut client = client;
    let mut backend = match dial(endpoint, policy.connect_timeout).await {
        Ok(stream) => stream,
        Err(source) => {
            drop(client);
            return Err(RelayError::Dial {
                endpoint: endpoint.clone(),
                source,
            });
        }
    };

    tracing::debug!(backend = %endpoint, mode = ?policy.mode, "Backend connected");

    let stats = match policy.mode {
        RelayMode::Lockstep => lockstep(&mut client, &mut backend, policy).await,
        RelayMode::Duplex => duplex(&mut client, &mut backend, policy.buffer_size).await,
    };

    // Both streams close here when they go out of scope.
    Ok(stats)
}

async fn dial(endpoint: &BackendEndpoint, deadline: Option<Duration>) -> io::Result<TcpStream> {
    with_deadline(deadline, TcpStream::connect(endpoint.connect_target())).await
}

/// Strict request/response relay: one backend read per client read.
///
/// While the backend is answering, the client is still watched so that a
/// client leaving mid-exchange ends the session. A chunk the client sends
/// before the reply arrives is held and becomes the next exchange.
pub async fn lockstep<C, B>(client: &mut C, backend: &mut B, policy: &RelayPolicy) -> RelayStats
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; policy.buffer_size];
    let mut early = vec![0u8; policy.buffer_size];
    let mut early_len = 0;
    let mut stats = RelayStats::default();

    loop {
        let n = if early_len > 0 {
            std::mem::swap(&mut buf, &mut early);
            std::mem::take(&mut early_len)
        } else {
            match with_deadline(policy.client_read_timeout, client.read(&mut buf)).await {
                Ok(0) => {
                    tracing::trace!("Client closed");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(error = %e, "Client read failed");
                    break;
                }
            }
        };
        stats.exchanges += 1;

        match backend.write_all(&buf[..n]).await {
            Ok(()) => stats.bytes_to_backend += n as u64,
            Err(e) => tracing::debug!(error = %e, bytes = n, "Backend write failed"),
        }

        let reply = {
            let backend_read = with_deadline(policy.backend_read_timeout, backend.read(&mut buf));
            tokio::pin!(backend_read);

            loop {
                tokio::select! {
                    result = &mut backend_read => break Some(result),
                    result = client.read(&mut early), if early_len == 0 => match result {
                        Ok(0) => {
                            tracing::trace!("Client closed while awaiting backend");
                            break None;
                        }
                        Ok(m) => early_len = m,
                        Err(e) => {
                            tracing::debug!(error = %e, "Client read failed while awaiting backend");
                            break None;
                        }
                    },
                }
            }
        };
        let Some(reply) = reply else {
            break;
        };

        match reply {
            Ok(0) => tracing::trace!("Backend returned no data"),
            Ok(m) => match client.write_all(&buf[..m]).await {
                Ok(()) => stats.bytes_to_client += m as u64,
                Err(e) => tracing::debug!(error = %e, bytes = m, "Client write failed"),
            },
            Err(e) => tracing::debug!(error = %e, "Backend read failed"),
        }
    }

    stats
}

/// Independent copy in both directions until both sides finish or one fails.
///
/// EOF on one side is passed on as a write shutdown to the other. The first
/// error ends both directions; the counts still cover every byte delivered.
pub async fn duplex<C, B>(client: &mut C, backend: &mut B, buffer_size: usize) -> RelayStats
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_rx, mut client_tx) = tokio::io::split(client);
    let (mut backend_rx, mut backend_tx) = tokio::io::split(backend);
    let mut stats = RelayStats::default();

    let outcome = tokio::try_join!(
        pump(&mut client_rx, &mut backend_tx, buffer_size, &mut stats.bytes_to_backend),
        pump(&mut backend_rx, &mut client_tx, buffer_size, &mut stats.bytes_to_client),
    );
    if let Err(e) = outcome {
        tracing::debug!(
            error = %e,
            bytes_to_backend = stats.bytes_to_backend,
            bytes_to_client = stats.bytes_to_client,
            "Duplex relay ended with error"
        );
    }

    stats
}

async fn pump<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
    delivered: &mut u64,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return writer.shutdown().await;
        }
        writer.write_all(&buf[..n]).await?;
        *delivered += n as u64;
    }
}
