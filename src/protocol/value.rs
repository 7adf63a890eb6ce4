//! Value definitions
//!
//! The tagged variant exchanged over the wire, in both directions.

use bytes::Bytes;
use thiserror::Error;

/// A single RESP frame
///
/// A null bulk string (`$-1`) and a null array (`*-1`) both decode to
/// [`Value::Null`]; `Null` always encodes as `$-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absent value
    Null,

    /// Signed 64-bit integer (`:`)
    Integer(i64),

    /// Single-line text (`+`), never contains CR or LF
    SimpleString(String),

    /// Length-prefixed binary payload (`$`)
    BulkString(Bytes),

    /// Ordered sequence of values (`*`)
    Array(Vec<Value>),

    /// Single-line error message (`-`), never contains CR or LF
    Error(String),
}

/// Text that cannot be carried by a single-line frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("text contains a line terminator: {0:?}")]
pub struct InvalidValue(pub String);

impl Value {
    /// Build a simple string, rejecting text with CR or LF
    pub fn simple_string(text: impl Into<String>) -> Result<Self, InvalidValue> {
        single_line(text.into()).map(Value::SimpleString)
    }

    /// Build an error value, rejecting text with CR or LF
    pub fn error(message: impl Into<String>) -> Result<Self, InvalidValue> {
        single_line(message.into()).map(Value::Error)
    }

    /// Build an error value, replacing any CR or LF with a space
    ///
    /// For messages that may echo client input.
    pub fn error_lossy(message: impl Into<String>) -> Self {
        Value::Error(message.into().replace(['\r', '\n'], " "))
    }

    /// Build a bulk string from anything byte-like
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(data.into())
    }

    /// `+OK`
    pub fn ok() -> Self {
        Value::SimpleString("OK".to_string())
    }

    /// Build a command frame: an array of bulk strings
    pub fn command<I, B>(parts: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Value::Array(parts.into_iter().map(|p| Value::BulkString(p.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<Option<Bytes>> for Value {
    fn from(value: Option<Bytes>) -> Self {
        match value {
            Some(data) => Value::BulkString(data),
            None => Value::Null,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

fn single_line(text: String) -> Result<String, InvalidValue> {
    if text.contains(['\r', '\n']) {
        Err(InvalidValue(text))
    } else {
        Ok(text)
    }
}
