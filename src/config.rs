//! Configuration for toyredis
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, ToyRedisError};
use crate::protocol::{DEFAULT_MAX_BULK_LENGTH, DEFAULT_MAX_LINE_LENGTH};

/// Main configuration for a toyredis server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Idle read timeout per connection (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Limits
    // -------------------------------------------------------------------------
    /// Max bytes scanned while looking for a CRLF terminator
    pub max_line_length: usize,

    /// Max declared length of a single bulk string
    pub max_bulk_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            max_connections: 1024,
            read_timeout_ms: 300_000, // 5 minutes
            write_timeout_ms: 5000,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_bulk_length: DEFAULT_MAX_BULK_LENGTH,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(ToyRedisError::Config("listen_addr is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ToyRedisError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_line_length == 0 {
            return Err(ToyRedisError::Config(
                "max_line_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the idle read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum line length accepted before a CRLF
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    /// Set the maximum bulk string length
    pub fn max_bulk_length(mut self, bytes: usize) -> Self {
        self.config.max_bulk_length = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
