//! Command Handler
//!
//! Turns one request line into one [`Response`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │   parse()   │───>│  dispatch() │───>│  Response   │      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! │                            │                                │
//! │                            ▼                                │
//! │                          Store                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::{parse_command, Command, Response};
use crate::storage::Store;
use std::sync::Arc;
use tracing::debug;

/// Executes request lines against the shared store.
#[derive(Clone, Debug)]
pub struct CommandHandler {
    /// The shared store
    storage: Arc<Store>,
}

impl CommandHandler {
    /// Creates a new command handler with the given store.
    pub fn new(storage: Arc<Store>) -> Self {
        Self { storage }
    }

    /// Parses and executes a single request line.
    ///
    /// `line` must already have its terminator stripped. Malformed input is
    /// answered with [`Response::Err`]; this never fails.
    pub fn execute(&self, line: &[u8]) -> Response {
        match parse_command(line) {
            Ok(command) => self.dispatch(command),
            Err(e) => {
                debug!(error = %e, "Rejected request");
                Response::Err
            }
        }
    }

    /// Runs a parsed command.
    pub fn dispatch(&self, command: Command) -> Response {
        match command {
            Command::Get { key } => match self.storage.get(&key) {
                Some(value) => Response::Value(value),
                None => Response::None,
            },
            Command::Put { key, value } => {
                self.storage.put(key, value);
                Response::Ok
            }
        }
    }
}
