//! Connection Handler
//!
//! Handles individual client connections.
//!
//! ## Lifecycle
//! ```text
//! AwaitRequest ──▶ Processing ──▶ Responding ──▶ AwaitRequest
//!      │                                │
//!      └──(EOF / framing error)──▶ Closed ◀──(write failure)
//! ```
//! Exactly one request is in flight per connection.

use std::any::Any;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, ToyRedisError};
use crate::protocol::{write_value, DecodeError, Decoder, Value};

/// Handles a single client connection
pub struct Connection<R, W> {
    /// Request decoder over the byte source
    decoder: Decoder<R>,

    /// Reply sink
    writer: W,

    /// Reference to the request executor
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<BufReader<TcpStream>, BufWriter<TcpStream>> {
    /// Create a connection handler over an accepted TCP stream
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn from_tcp(stream: TcpStream, engine: Arc<Engine>, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self::new(
            BufReader::new(read_stream),
            BufWriter::new(write_stream),
            engine,
            config,
        )
        .with_peer_addr(peer_addr))
    }
}

impl<R: BufRead, W: Write> Connection<R, W> {
    /// Create a connection handler over any byte source and sink
    pub fn new(reader: R, writer: W, engine: Arc<Engine>, config: &Config) -> Self {
        Self {
            decoder: Decoder::with_limits(reader, config.max_line_length, config.max_bulk_length),
            writer,
            engine,
            peer_addr: "local".to_string(),
        }
    }

    /// Label used for this peer in log lines
    pub fn with_peer_addr(mut self, peer_addr: impl Into<String>) -> Self {
        self.peer_addr = peer_addr.into();
        self
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends replies. Returns `Ok(())` when the
    /// client disconnects or goes idle past the read timeout. A framing error
    /// is answered with a protocol error reply and then returned.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match self.decoder.read_value() {
                Ok(Some(value)) => value,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(DecodeError::Io(ref e)) if is_disconnect(e) => {
                    tracing::debug!("Connection with {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(DecodeError::Io(ref e)) if is_timeout(e) => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    if !e.is_io() {
                        let reply = Value::error_lossy(format!("ERR protocol error: {}", e));
                        let _ = self.send(&reply);
                    }
                    return Err(e.into());
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            let reply = self.execute(request);

            if let Err(e) = self.send(&reply) {
                // The client went away before we could answer; not a server fault
                if let ToyRedisError::Io(ref io_err) = e {
                    if is_disconnect(io_err) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a request and turn every outcome into a reply value
    fn execute(&self, request: Value) -> Value {
        let engine = &self.engine;
        match panic::catch_unwind(AssertUnwindSafe(|| engine.execute(request))) {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::debug!("Command error for {}: {}", self.peer_addr, e);
                Value::error_lossy(format!("ERR {}", e))
            }
            Err(payload) => {
                tracing::error!(
                    "Internal error while serving {}: {}",
                    self.peer_addr,
                    panic_message(&*payload)
                );
                Value::Error("ERR internal error".to_string())
            }
        }
    }

    /// Send a reply to the client
    fn send(&mut self, value: &Value) -> Result<()> {
        write_value(&mut self.writer, value)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

// Windows reports TimedOut where Unix reports WouldBlock
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
