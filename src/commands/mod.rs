//! Command Handler Module
//!
//! This module implements the command processing layer for simple-kv.
//! It receives raw request lines, parses them with the protocol module,
//! executes them against the store, and returns the response to send back.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `GET key` - replies with the value, or `NONE`
//! - `PUT key value` - replies `OK`
//!
//! Anything else replies `ERR`.

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
