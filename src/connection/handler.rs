//! Connection Handler Module
//!
//! This module handles individual client connections to simple-kv.
//! Each client gets its own handler task that runs in a loop,
//! reading request lines and sending one response line for each.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read one line           │ │  READING_LINE
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Parse + execute         │ │  DISPATCHING
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Write + flush response  │ │  WRITING_RESPONSE
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. End of stream / read error       CLOSED
//! ```
//!
//! Malformed requests are answered with `ERR` and never end the loop.
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut`. TCP is a stream, so one read
//! may hold half a line or several lines; complete lines are split off the
//! front and answered one at a time, in order.

use crate::commands::CommandHandler;
use crate::protocol::strip_terminator;
use crate::protocol::types::LF;
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Line buffer limit (64 KB), terminator included.
///
/// A line is rejected once its content reaches this many bytes, so the
/// longest accepted line is `MAX_LINE_LENGTH - 1` bytes plus `\n`.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total request lines answered
    pub commands_processed: AtomicU64,
    /// Request lines answered with `ERR`
    pub protocol_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so it runs over a `TcpStream` in production and
/// over scripted mock I/O in tests.
pub struct ConnectionHandler<S> {
    /// The client stream; writes are buffered and flushed once per response
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (store shared across connections)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing requests
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Returns `Ok(())` when the client closes the connection, or the read or
    /// write error that ended it.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        debug!(
            client = %self.addr,
            active = self.stats.active_connections.load(Ordering::Relaxed),
            commands = self.stats.commands_processed.load(Ordering::Relaxed),
            protocol_errors = self.stats.protocol_errors.load(Ordering::Relaxed),
            "Connection closed"
        );
        result
    }

    /// The read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.next_line()? {
                self.process_line(&line).await?;
            }

            if !self.read_more_data().await? {
                break;
            }
        }

        // A last line with no terminator is still a request
        if !self.buffer.is_empty() {
            let line = self.buffer.split().freeze();
            self.process_line(&line).await?;
        }

        Ok(())
    }

    /// Splits the next complete line (terminator included) off the buffer.
    fn next_line(&mut self) -> Result<Option<Bytes>, ConnectionError> {
        let Some(pos) = self.buffer.iter().position(|&b| b == LF) else {
            return Ok(None);
        };

        if pos >= MAX_LINE_LENGTH {
            return Err(ConnectionError::LineTooLong {
                len: pos,
                max: MAX_LINE_LENGTH,
            });
        }

        let line = self.buffer.split_to(pos + 1).freeze();
        trace!(
            client = %self.addr,
            consumed = line.len(),
            remaining = self.buffer.len(),
            "Read line"
        );
        Ok(Some(line))
    }

    /// Answers one request line.
    async fn process_line(&mut self, line: &[u8]) -> Result<(), ConnectionError> {
        let response = self.command_handler.execute(strip_terminator(line));

        self.stats.command_processed();
        if response.is_error() {
            self.stats.protocol_error();
        }

        let bytes = response.serialize();
        self.send_response(&bytes).await
    }

    /// Reads more data from the socket into the buffer.
    ///
    /// Returns `false` on end of stream.
    async fn read_more_data(&mut self) -> Result<bool, ConnectionError> {
        // Everything left in the buffer is one unterminated line
        if self.buffer.len() >= MAX_LINE_LENGTH {
            return Err(ConnectionError::LineTooLong {
                len: self.buffer.len(),
                max: MAX_LINE_LENGTH,
            });
        }

        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(true)
    }

    /// Sends a response line to the client.
    async fn send_response(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request line reached `MAX_LINE_LENGTH` without a terminator
    #[error("line too long: {len} bytes (max: {max})")]
    LineTooLong { len: usize, max: usize },
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are already logged by the handler.
///
/// # Arguments
///
/// * `stream` - The client stream for this connection
/// * `addr` - The client's socket address
/// * `command_handler` - The command handler for executing requests
/// * `stats` - Shared connection statistics
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    let _ = handler.run().await;
}
