//! Protocol Data Types
//!
//! This module defines the parsed request (`Command`) and the reply
//! (`Response`) of the simple-kv line protocol.
//!
//! ## Protocol Format
//!
//! Every request and every response is one line terminated by `\n`.
//! Tokens are separated by single ASCII spaces, with no quoting or escaping.
//!
//! ## Examples
//!
//! Request: `PUT hello world\n` → Response: `OK\n`
//! Request: `GET hello\n` → Response: `world\n`
//! Request: `GET missing\n` → Response: `NONE\n`
//! Request: `DELETE hello\n` → Response: `ERR\n`

use bytes::{BufMut, Bytes, BytesMut};

/// The line terminator used by the protocol
pub const LF: u8 = b'\n';

/// Carriage return, tolerated before `LF` on incoming lines
pub const CR: u8 = b'\r';

/// Token separator
pub const SPACE: char = ' ';

/// Literal reply tokens
pub mod reply {
    pub const OK: &[u8] = b"OK";
    pub const NONE: &[u8] = b"NONE";
    pub const ERR: &[u8] = b"ERR";
}

/// A well-formed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET <key>`
    Get { key: String },

    /// `PUT <key> <value>`
    Put { key: String, value: String },
}

/// A reply line.
///
/// Every request gets exactly one of these, even malformed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The stored value, echoed verbatim.
    Value(String),

    /// `OK`: a put was applied.
    Ok,

    /// `NONE`: the key was never written.
    None,

    /// `ERR`: the request was malformed or unknown.
    Err,
}

impl Response {
    /// Serializes the response to bytes for sending over the wire.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.serialize_into(&mut buf);
        buf.freeze()
    }

    /// Serializes the response into an existing buffer.
    pub fn serialize_into(&self, buf: &mut BytesMut) {
        match self {
            Response::Value(v) => buf.put_slice(v.as_bytes()),
            Response::Ok => buf.put_slice(reply::OK),
            Response::None => buf.put_slice(reply::NONE),
            Response::Err => buf.put_slice(reply::ERR),
        }
        buf.put_u8(LF);
    }

    /// Length of the serialized line, terminator included.
    pub fn encoded_len(&self) -> usize {
        let body = match self {
            Response::Value(v) => v.len(),
            Response::Ok => reply::OK.len(),
            Response::None => reply::NONE.len(),
            Response::Err => reply::ERR.len(),
        };
        body + 1
    }

    /// Returns true if this is an `ERR` reply.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_literals() {
        assert_eq!(Response::Ok.serialize(), Bytes::from_static(b"OK\n"));
        assert_eq!(Response::None.serialize(), Bytes::from_static(b"NONE\n"));
        assert_eq!(Response::Err.serialize(), Bytes::from_static(b"ERR\n"));
    }

    #[test]
    fn test_serialize_value_verbatim() {
        let response = Response::Value("world".to_string());
        assert_eq!(response.serialize(), Bytes::from_static(b"world\n"));

        // A stored value that happens to spell a reply token is still echoed as-is
        let response = Response::Value("NONE".to_string());
        assert_eq!(response.serialize(), Bytes::from_static(b"NONE\n"));

        let response = Response::Value(String::new());
        assert_eq!(response.serialize(), Bytes::from_static(b"\n"));
    }

    #[test]
    fn test_encoded_len_matches() {
        for response in [
            Response::Ok,
            Response::None,
            Response::Err,
            Response::Value("abc".to_string()),
        ] {
            assert_eq!(response.serialize().len(), response.encoded_len());
        }
    }

    #[test]
    fn test_is_error() {
        assert!(Response::Err.is_error());
        assert!(!Response::None.is_error());
        assert!(!Response::Value("ERR".to_string()).is_error());
    }
}
