//! # simple-kv - A Simple In-Memory Key-Value Store
//!
//! simple-kv keeps string keys and values in memory and serves them over a
//! newline-delimited text protocol on TCP.
//!
//! ## Features
//!
//! - **Tiny protocol**: `GET key` and `PUT key value`, one reply line each
//! - **Forgiving**: malformed lines get `ERR` and the connection stays open
//! - **Concurrent**: one Tokio task per client, one mutex around the map
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            simple-kv                             │
//! │                                                                  │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐           │
//! │  │  Listener   │───>│ Connection  │───>│  Command    │           │
//! │  │   Loop      │    │  Handler    │    │  Handler    │           │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘           │
//! │                                               │                  │
//! │                     ┌─────────────┐           ▼                  │
//! │                     │    Line     │    ┌──────────────────────┐  │
//! │                     │   Parser    │    │ Store                │  │
//! │                     └─────────────┘    │ Mutex<HashMap>       │  │
//! │                                        └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use simple_kv::connection::ConnectionStats;
//! use simple_kv::server::accept_loop;
//! use simple_kv::storage::Store;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(Store::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("0.0.0.0:5556").await.unwrap();
//!     accept_loop(listener, storage, stats).await;
//! }
//! ```
//!
//! ## Protocol
//!
//! | Request            | Reply                      |
//! |--------------------|----------------------------|
//! | `GET k` (present)  | the value, verbatim        |
//! | `GET k` (absent)   | `NONE`                     |
//! | `PUT k v`          | `OK`                       |
//! | anything else      | `ERR`                      |
//!
//! Tokens are split on single spaces with no escaping, so values cannot
//! contain spaces.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line parser and response types
//! - [`storage`]: The shared, mutex-guarded store
//! - [`commands`]: Executes parsed requests against the store
//! - [`connection`]: Per-client read/dispatch/reply loop
//! - [`server`]: The accept loop

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionError, ConnectionStats};
pub use protocol::{parse_command, Command, ParseError, Response};
pub use server::{accept_loop, report_stats, summarize, ServerSummary};
pub use storage::Store;

/// The port simple-kv listens on
pub const DEFAULT_PORT: u16 = 5556;

/// The default host simple-kv binds to (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// How often the server logs its counters
pub const STATS_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Version of simple-kv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
