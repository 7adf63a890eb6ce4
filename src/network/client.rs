//! Blocking client
//!
//! Sends one command at a time and waits for its reply.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{Result, ToyRedisError};
use crate::protocol::{write_value, Decoder, Value};

/// A connection to a toyredis server
pub struct Client {
    decoder: Decoder<BufReader<TcpStream>>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            decoder: Decoder::new(BufReader::new(read_stream)),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command given as its parts (name first) and read the reply
    pub fn send<I, B>(&mut self, parts: I) -> Result<Value>
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.send_value(&Value::command(parts))
    }

    /// Send an arbitrary frame and read the reply
    pub fn send_value(&mut self, request: &Value) -> Result<Value> {
        write_value(&mut self.writer, request)?;
        self.read_reply()
    }

    /// Read one reply frame
    pub fn read_reply(&mut self) -> Result<Value> {
        self.decoder
            .read_value()?
            .ok_or_else(|| ToyRedisError::Network("connection closed by server".to_string()))
    }
}
