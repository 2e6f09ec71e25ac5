//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use tcp_balancer::config::{BackendConfig, ProxyConfig};
use tcp_balancer::net::connection::ConnectionTracker;

/// Start a backend that answers every chunk with a fixed reply.
pub async fn start_fixed_backend(reply: &'static [u8]) -> SocketAddr {
    start_backend(move |_chunk| reply.to_vec()).await
}

/// Start a backend that echoes every chunk back prefixed with `tag` and ':'.
pub async fn start_tagged_echo_backend(tag: &'static str) -> SocketAddr {
    start_backend(move |chunk| {
        let mut reply = format!("{tag}:").into_bytes();
        reply.extend_from_slice(chunk);
        reply
    })
    .await
}

/// Start a programmable backend. `f` maps each received chunk to the reply.
pub async fn start_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    let reply = f(&buf[..n]);
                                    if socket.write_all(&reply).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that answers "PONG" and reports on `closed` once a peer
/// connection reaches EOF.
pub async fn start_reporting_backend() -> (SocketAddr, mpsc::UnboundedReceiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let closed_tx = closed_tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            if socket.write_all(b"PONG").await.is_err() {
                                break;
                            }
                        }
                    }
                }
                let _ = closed_tx.send(());
            });
        }
    });

    (addr, closed_rx)
}

/// An address nothing is listening on.
pub fn unreachable_addr() -> SocketAddr {
    let vacant = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    vacant.local_addr().unwrap()
}

/// Proxy config bound to an ephemeral local port over the given backends.
pub fn proxy_config(backends: &[SocketAddr]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig::new(addr.ip().to_string(), addr.port()))
        .collect();
    config
}

/// Start the proxy in the background. Returns its address and session tracker.
pub async fn start_proxy(config: &ProxyConfig) -> (SocketAddr, ConnectionTracker) {
    let proxy = tcp_balancer::start(config).unwrap();
    let addr = proxy.local_addr().unwrap();
    let tracker = proxy.tracker();
    tokio::spawn(proxy.serve());
    (addr, tracker)
}

/// Send one chunk and read one reply.
pub async fn exchange(stream: &mut TcpStream, request: &[u8]) -> Vec<u8> {
    stream.write_all(request).await.unwrap();
    let mut buf = [0u8; 4096];
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("reply timed out")
        .unwrap();
    buf[..n].to_vec()
}

/// Poll `tracker` until no session is live, or panic after `limit`.
pub async fn wait_for_idle(tracker: &ConnectionTracker, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    while tracker.active_count() > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} sessions still active",
            tracker.active_count()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
