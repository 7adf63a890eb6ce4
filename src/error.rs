//! Error types for toyredis
//!
//! Provides a unified error type for all operations. The protocol and
//! command layers keep their own narrower error enums, which convert into
//! [`ToyRedisError`] at the crate boundary.

use thiserror::Error;

use crate::command::CommandError;
use crate::protocol::DecodeError;

/// Result type alias using ToyRedisError
pub type Result<T> = std::result::Result<T, ToyRedisError>;

/// Unified error type for toyredis operations
#[derive(Debug, Error)]
pub enum ToyRedisError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
