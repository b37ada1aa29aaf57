//! Storage Module
//!
//! This module provides the shared key-value store for simple-kv: one
//! mutex-guarded `HashMap` that every client connection reads and writes.
//!
//! ## Features
//!
//! - **Linearizable**: every get and put takes the same exclusive lock
//! - **Unbounded**: no eviction, no expiry, no size limit
//! - **Observable**: relaxed counters for gets, hits and puts
//!
//! ## Example
//!
//! ```
//! use simple_kv::storage::Store;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//!
//! store.put("hello", "world");
//! assert_eq!(store.get("hello"), Some("world".to_string()));
//! ```

pub mod engine;

pub use engine::{Store, StoreStats};
