//! Frame decoder
//!
//! Reads exactly one top-level [`Value`] per call from any [`BufRead`]
//! source. Scalars are terminated by CRLF; bulk strings are read by their
//! declared length and must be followed by CRLF.

use std::io::{self, BufRead, Cursor, Read};

use bytes::Bytes;
use thiserror::Error;

use super::{Value, CRLF, DEFAULT_MAX_BULK_LENGTH, DEFAULT_MAX_LINE_LENGTH};

/// Max array nesting accepted from a peer
pub const MAX_NESTING_DEPTH: usize = 128;

/// Upper bound on capacity reserved up front from a declared count/length
const PREALLOC_LIMIT: usize = 64 * 1024;

/// Reasons a frame could not be decoded
///
/// A clean end of stream is not represented here: [`Decoder::read_value`]
/// returns `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid prefix byte 0x{0:02x}")]
    MalformedPrefix(u8),

    #[error("missing separator")]
    MissingTerminator,

    #[error("request is too big (limit {limit} bytes)")]
    OversizedRequest { limit: usize },

    #[error("invalid encoding")]
    InvalidEncoding,

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("array nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// True for failures of the transport itself rather than of the framing
    pub fn is_io(&self) -> bool {
        matches!(self, DecodeError::Io(_))
    }
}

/// Decodes values from a buffered byte source
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    max_line_length: usize,
    max_bulk_length: usize,
}

impl<R: BufRead> Decoder<R> {
    /// Create a decoder with the default size limits
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_BULK_LENGTH)
    }

    /// Create a decoder with explicit size limits
    pub fn with_limits(reader: R, max_line_length: usize, max_bulk_length: usize) -> Self {
        Self {
            reader,
            max_line_length,
            max_bulk_length,
        }
    }

    /// Read one complete value
    ///
    /// Returns `Ok(None)` if the stream ended before the first byte of a frame.
    pub fn read_value(&mut self) -> Result<Option<Value>, DecodeError> {
        match self.read_prefix()? {
            Some(prefix) => self.read_payload(prefix, 0).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    // =========================================================================
    // Frame Parsing
    // =========================================================================

    fn read_nested(&mut self, depth: usize) -> Result<Value, DecodeError> {
        match self.read_prefix()? {
            Some(prefix) => self.read_payload(prefix, depth),
            None => Err(DecodeError::MissingTerminator),
        }
    }

    fn read_payload(&mut self, prefix: u8, depth: usize) -> Result<Value, DecodeError> {
        match prefix {
            b'*' => self.read_array(depth),
            b'$' => self.read_bulk(),
            b'+' => Ok(Value::SimpleString(self.read_text()?)),
            b':' => Ok(Value::Integer(self.read_integer()?)),
            b'-' => Ok(Value::Error(self.read_text()?)),
            other => Err(DecodeError::MalformedPrefix(other)),
        }
    }

    fn read_array(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }

        let count = match self.read_integer()? {
            -1 => return Ok(Value::Null),
            n => usize::try_from(n).map_err(|_| DecodeError::InvalidNumber(n.to_string()))?,
        };

        let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            items.push(self.read_nested(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn read_bulk(&mut self) -> Result<Value, DecodeError> {
        let len = match self.read_integer()? {
            -1 => return Ok(Value::Null),
            n => usize::try_from(n).map_err(|_| DecodeError::InvalidNumber(n.to_string()))?,
        };
        if len > self.max_bulk_length {
            return Err(DecodeError::OversizedRequest {
                limit: self.max_bulk_length,
            });
        }

        // Body plus its trailing CRLF
        let want = len + CRLF.len();
        let mut body = Vec::with_capacity(want.min(PREALLOC_LIMIT));
        (&mut self.reader).take(want as u64).read_to_end(&mut body)?;

        if body.len() < want || !body.ends_with(CRLF) {
            return Err(DecodeError::MissingTerminator);
        }
        body.truncate(len);
        Ok(Value::BulkString(Bytes::from(body)))
    }

    fn read_text(&mut self) -> Result<String, DecodeError> {
        let line = self.read_line()?;
        String::from_utf8(line).map_err(|_| DecodeError::InvalidEncoding)
    }

    fn read_integer(&mut self) -> Result<i64, DecodeError> {
        let text = self.read_text()?;
        text.parse::<i64>()
            .map_err(|_| DecodeError::InvalidNumber(text))
    }

    // =========================================================================
    // Byte-level Reads
    // =========================================================================

    fn read_prefix(&mut self) -> Result<Option<u8>, DecodeError> {
        let prefix = match self.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        self.reader.consume(1);
        Ok(Some(prefix))
    }

    /// Read through the next CRLF and return the line without it
    fn read_line(&mut self) -> Result<Vec<u8>, DecodeError> {
        let mut line = Vec::new();

        loop {
            let available = self.fill_buf()?;
            if available.is_empty() {
                return Err(DecodeError::MissingTerminator);
            }

            let (used, found_lf) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            line.extend_from_slice(&available[..used]);
            self.reader.consume(used);

            // A bare LF is payload, only CRLF terminates
            if found_lf && line.ends_with(CRLF) {
                line.truncate(line.len() - CRLF.len());
                if line.len() > self.max_line_length {
                    return Err(DecodeError::OversizedRequest {
                        limit: self.max_line_length,
                    });
                }
                return Ok(line);
            }

            if line.len() > self.max_line_length.saturating_add(CRLF.len()) {
                return Err(DecodeError::OversizedRequest {
                    limit: self.max_line_length,
                });
            }
        }
    }

    fn fill_buf(&mut self) -> Result<&[u8], DecodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        // Returns the already-buffered bytes (or the same EOF) without another read
        Ok(self.reader.fill_buf()?)
    }
}

/// Decode a single value from an in-memory buffer using default limits
pub fn decode(bytes: &[u8]) -> Result<Option<Value>, DecodeError> {
    Decoder::new(Cursor::new(bytes)).read_value()
}
