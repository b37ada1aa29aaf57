//! Listener Loop
//!
//! Accepts connections forever and gives each one its own Tokio task.
//! A failed accept is logged and the loop keeps going; there is no shutdown
//! path, connection limit or backpressure.
//!
//! [`report_stats`] runs beside the loop and logs the server counters.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::{Store, StoreStats};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// A point-in-time view of the store and connection counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSummary {
    pub store: StoreStats,
    pub connections_accepted: u64,
    pub active_connections: u64,
    pub commands_processed: u64,
    pub protocol_errors: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Reads every counter once.
pub fn summarize(storage: &Store, stats: &ConnectionStats) -> ServerSummary {
    ServerSummary {
        store: storage.stats(),
        connections_accepted: stats.connections_accepted.load(Ordering::Relaxed),
        active_connections: stats.active_connections.load(Ordering::Relaxed),
        commands_processed: stats.commands_processed.load(Ordering::Relaxed),
        protocol_errors: stats.protocol_errors.load(Ordering::Relaxed),
        bytes_read: stats.bytes_read.load(Ordering::Relaxed),
        bytes_written: stats.bytes_written.load(Ordering::Relaxed),
    }
}

/// Logs a [`ServerSummary`] every `period`. This future never completes.
pub async fn report_stats(storage: Arc<Store>, stats: Arc<ConnectionStats>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let summary = summarize(&storage, &stats);
        info!(
            keys = summary.store.keys,
            gets = summary.store.gets,
            hits = summary.store.hits,
            puts = summary.store.puts,
            connections = summary.connections_accepted,
            active = summary.active_connections,
            commands = summary.commands_processed,
            protocol_errors = summary.protocol_errors,
            bytes_read = summary.bytes_read,
            bytes_written = summary.bytes_written,
            "Server stats"
        );
    }
}

/// Main loop that accepts incoming connections.
///
/// Every connection gets a fresh [`CommandHandler`] over the same `store`.
/// This future never completes.
pub async fn accept_loop(listener: TcpListener, storage: Arc<Store>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(client = %addr, "Accepted connection");

                // Create a command handler for this connection
                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!(error = %e, "Unable to accept connection");
            }
        }
    }
}
