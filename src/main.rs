//! simple-kv - A Simple In-Memory Key-Value Store
//!
//! This is the main entry point for the simple-kv server.
//! It sets up logging, binds the TCP listener and runs the accept loop.

use anyhow::Context;
use simple_kv::connection::ConnectionStats;
use simple_kv::server::{accept_loop, report_stats};
use simple_kv::storage::Store;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Server configuration
///
/// The server has no flags or config file; it always uses the defaults.
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: simple_kv::DEFAULT_HOST.to_string(),
            port: simple_kv::DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::default();

    // Set up logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!(
        "Starting simple-kv server v{} with listening port {}",
        simple_kv::VERSION,
        config.port
    );

    // Create the store (shared across all connections)
    let storage = Arc::new(Store::new());

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = match TcpListener::bind(config.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %config.bind_address(), error = %e, "Unable to bind listener");
            return Err(e).with_context(|| format!("failed to bind {}", config.bind_address()));
        }
    };
    info!("Listening on {}", config.bind_address());

    // Periodic counters in the log
    tokio::spawn(report_stats(
        Arc::clone(&storage),
        Arc::clone(&stats),
        simple_kv::STATS_INTERVAL,
    ));

    // Runs until the process is killed
    accept_loop(listener, storage, stats).await;

    Ok(())
}
