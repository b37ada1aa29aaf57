//! Line Protocol Implementation
//!
//! This module implements the simple-kv text protocol: newline-terminated
//! requests of space-separated tokens, answered by exactly one line each.
//!
//! ## Modules
//!
//! - `types`: Defines `Command`, `Response` and response serialization
//! - `parser`: Splits and validates an incoming request line
//!
//! ## Example
//!
//! ```
//! use simple_kv::protocol::{parse_command, Command, Response};
//!
//! // Parsing an incoming line
//! let command = parse_command(b"PUT hello world").unwrap();
//! assert_eq!(
//!     command,
//!     Command::Put { key: "hello".to_string(), value: "world".to_string() }
//! );
//!
//! // Creating responses
//! let bytes = Response::Value("world".to_string()).serialize();
//! assert_eq!(&bytes[..], b"world\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_command, strip_terminator, ParseError, ParseResult};
pub use types::{Command, Response};
