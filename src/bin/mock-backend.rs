//! Stand-in backend for trying the balancer locally.
//!
//! Answers every chunk it receives with a small HTTP response naming itself,
//! and keeps the connection open so lockstep sessions can continue.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Parser)]
#[command(name = "mock-backend")]
#[command(about = "Fixed-response TCP backend for local testing", long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8081)]
    port: u16,

    /// Name included in every response.
    #[arg(short, long, default_value = "Backend 1")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_backend=info".into()),
        )
        .init();

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, name = %cli.name, "Mock backend listening");

    let body = format!("<h1>Response from {}</h1>", cli.name);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        let response = response.clone();
        tokio::spawn(async move {
            if let Err(e) = answer(socket, response.as_bytes()).await {
                tracing::debug!(peer = %peer, error = %e, "Connection ended with error");
            }
        });
    }
}

async fn answer(mut socket: TcpStream, response: &[u8]) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        socket.write_all(response).await?;
    }
}
