//! Round-robin TCP load balancer (v1)
//!
//! Accepts TCP clients and hands each one to the next backend in a fixed pool,
//! relaying bytes until the client disconnects.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                TCP BALANCER                   │
//!                          │                                               │
//!     Client connection    │  ┌──────────┐   ┌──────────────┐              │
//!     ─────────────────────┼─▶│   net    │──▶│load_balancer │              │
//!                          │  │ listener │   │ round robin  │              │
//!                          │  └────┬─────┘   └──────┬───────┘              │
//!                          │       │ spawn          │ endpoint             │
//!                          │       ▼                ▼                      │
//!     Client ◀─────────────┼──┌────────────────────────────┐              │
//!                          │  │    net::relay (session)     │◀────────────┼──── Backend
//!                          │  │ dial → lockstep → teardown  │─────────────┼───▶ Server
//!                          │  └────────────────────────────┘              │
//!                          │                                               │
//!                          │  config · observability · resilience ·        │
//!                          │  lifecycle                                    │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tcp_balancer::config::{load_config, ProxyConfig};
use tcp_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "tcp-balancer")]
#[command(about = "Round-robin TCP load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 0.0.0.0:8080).
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                logging::init(cli.log_level.as_deref().unwrap_or("info"));
                tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => ProxyConfig::default(),
    };

    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("tcp-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let proxy = match tcp_balancer::start(&config) {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    match proxy.local_addr() {
        Ok(addr) => tracing::info!(address = %addr, "Load balancer running"),
        Err(e) => tracing::warn!(error = %e, "Load balancer running, local address unavailable"),
    }

    match proxy.serve().await {}
}
