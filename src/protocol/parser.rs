//! Request Line Parser
//!
//! This module turns one request line into a [`Command`].
//!
//! ## Grammar
//!
//! The line is split on every single ASCII space. Nothing is collapsed or
//! trimmed, so empty tokens count:
//!
//! - `GET  k` is three tokens (`GET`, ``, `k`) and is rejected
//! - `GET ` is two tokens and looks up the empty key
//!
//! A value can never contain a space; `PUT k two words` has too many tokens.
//! Command names are case-sensitive.
//!
//! Framing lives in the connection handler: by the time a line reaches
//! [`parse_command`], its `\n` (and an optional trailing `\r`) are gone.

use crate::protocol::types::{Command, CR, LF, SPACE};
use thiserror::Error;

/// Why a request line was rejected.
///
/// None of these reach the client; every variant is answered with `ERR`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Fewer than two space-separated tokens
    #[error("expected at least 2 tokens, got {0}")]
    TooFewTokens(usize),

    /// Known command with the wrong number of arguments
    #[error("wrong number of arguments for '{command}': expected {expected}, got {got}")]
    WrongArity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// Command name is not `GET` or `PUT`
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Strips the line terminator: one `\n`, then one `\r` if present.
///
/// Lines without a terminator (the last line before end-of-stream) are
/// returned unchanged.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(&[LF]).unwrap_or(line);
    line.strip_suffix(&[CR]).unwrap_or(line)
}

/// Parses one request line (terminator already removed).
pub fn parse_command(line: &[u8]) -> ParseResult<Command> {
    let line = std::str::from_utf8(line).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

    let words: Vec<&str> = line.split(SPACE).collect();
    if words.len() < 2 {
        return Err(ParseError::TooFewTokens(words.len()));
    }

    let (command, args) = (words[0], &words[1..]);
    match command {
        "GET" => match args {
            [key] => Ok(Command::Get {
                key: (*key).to_owned(),
            }),
            _ => Err(ParseError::WrongArity {
                command: "GET",
                expected: 1,
                got: args.len(),
            }),
        },
        "PUT" => match args {
            [key, value] => Ok(Command::Put {
                key: (*key).to_owned(),
                value: (*value).to_owned(),
            }),
            _ => Err(ParseError::WrongArity {
                command: "PUT",
                expected: 2,
                got: args.len(),
            }),
        },
        other => Err(ParseError::UnknownCommand(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(key: &str) -> Command {
        Command::Get {
            key: key.to_string(),
        }
    }

    fn put(key: &str, value: &str) -> Command {
        Command::Put {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_parse_get() {
        assert_eq!(parse_command(b"GET hello"), Ok(get("hello")));
    }

    #[test]
    fn test_parse_put() {
        assert_eq!(parse_command(b"PUT hello world"), Ok(put("hello", "world")));
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(parse_command(b""), Err(ParseError::TooFewTokens(1)));
        assert_eq!(parse_command(b"FOO"), Err(ParseError::TooFewTokens(1)));
        assert_eq!(parse_command(b"GET"), Err(ParseError::TooFewTokens(1)));
    }

    #[test]
    fn test_wrong_arity() {
        assert!(matches!(
            parse_command(b"PUT a"),
            Err(ParseError::WrongArity { command: "PUT", expected: 2, got: 1 })
        ));
        assert!(matches!(
            parse_command(b"GET a b"),
            Err(ParseError::WrongArity { command: "GET", expected: 1, got: 2 })
        ));
    }

    #[test]
    fn test_value_with_space_is_malformed() {
        assert!(matches!(
            parse_command(b"PUT k two words"),
            Err(ParseError::WrongArity { got: 3, .. })
        ));
    }

    #[test]
    fn test_single_space_split() {
        // Double space yields an empty token, so GET gets two arguments
        assert!(matches!(
            parse_command(b"GET  k"),
            Err(ParseError::WrongArity { got: 2, .. })
        ));

        // Trailing space yields an empty key
        assert_eq!(parse_command(b"GET "), Ok(get("")));
        assert_eq!(parse_command(b"PUT k "), Ok(put("k", "")));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(
            parse_command(b"get hello"),
            Err(ParseError::UnknownCommand("get".to_string()))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command(b"DELETE hello"),
            Err(ParseError::UnknownCommand("DELETE".to_string()))
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            parse_command(b"GET \xff\xfe"),
            Err(ParseError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"GET k\n"), b"GET k");
        assert_eq!(strip_terminator(b"GET k\r\n"), b"GET k");
        assert_eq!(strip_terminator(b"GET k"), b"GET k");
        assert_eq!(strip_terminator(b"\n"), b"");
        // Only one CR is dropped
        assert_eq!(strip_terminator(b"GET k\r\r\n"), b"GET k\r");
    }
}
