//! Frame encoder
//!
//! Encoding is total over [`Value`]: every variant has exactly one wire form.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::{Value, CRLF};

/// Encode a value into a fresh buffer
pub fn encode(value: &Value) -> Bytes {
    let mut buf = BytesMut::new();
    encode_into(value, &mut buf);
    buf.freeze()
}

/// Append the encoding of `value` to `dst`
pub fn encode_into(value: &Value, dst: &mut BytesMut) {
    match value {
        Value::SimpleString(text) => put_line(dst, b'+', text.as_bytes()),
        Value::Error(message) => put_line(dst, b'-', message.as_bytes()),
        Value::Integer(n) => put_line(dst, b':', n.to_string().as_bytes()),
        Value::Null => dst.put_slice(b"$-1\r\n"),
        Value::BulkString(data) => {
            put_line(dst, b'$', data.len().to_string().as_bytes());
            dst.reserve(data.len() + CRLF.len());
            dst.put_slice(data);
            dst.put_slice(CRLF);
        }
        Value::Array(items) => {
            put_line(dst, b'*', items.len().to_string().as_bytes());
            for item in items {
                encode_into(item, dst);
            }
        }
    }
}

/// Encode a value and write it to a sink, then flush
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> std::io::Result<()> {
    writer.write_all(&encode(value))?;
    writer.flush()
}

fn put_line(dst: &mut BytesMut, prefix: u8, body: &[u8]) {
    dst.reserve(1 + body.len() + CRLF.len());
    dst.put_u8(prefix);
    dst.put_slice(body);
    dst.put_slice(CRLF);
}
