//! Protocol Module
//!
//! Defines the RESP-style wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────────────────────────┬──────────┐
//! │Prefix (1)│           Payload            │   CRLF   │
//! └──────────┴──────────────────────────────┴──────────┘
//! ```
//!
//! ### Prefixes
//! - `*`: Array        - Payload: count, CRLF, then `count` nested frames
//! - `$`: Bulk string  - Payload: length, CRLF, then `length` raw bytes + CRLF (`-1` = null)
//! - `+`: Simple string - Payload: text
//! - `:`: Integer      - Payload: base-10 signed integer
//! - `-`: Error        - Payload: message text
//!
//! A request is always an array of bulk strings whose first element is the
//! command name.

mod value;
mod decoder;
mod encoder;

pub use value::{InvalidValue, Value};
pub use decoder::{decode, DecodeError, Decoder, MAX_NESTING_DEPTH};
pub use encoder::{encode, encode_into, write_value};

/// Line terminator for every frame
pub const CRLF: &[u8] = b"\r\n";

/// Default max bytes scanned for a CRLF (64 KB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default max bulk string length (512 MB)
pub const DEFAULT_MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
