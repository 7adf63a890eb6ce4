//! # toyredis
//!
//! A minimal key-value server speaking a RESP-style wire protocol:
//! - Length-prefixed, CRLF-delimited frames (arrays, bulk/simple strings, integers, errors)
//! - GET, SET, MGET, MSET, DEL and FLUSHDB over a shared in-memory keyspace
//! - One request in flight per connection, one thread per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Connection Loop                             │
//! │          decode ──▶ dispatch ──▶ encode                      │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │   Wire Codec    │            │  Command Table  │
//!   │ (Value frames)  │            │  (dispatcher)   │
//!   └─────────────────┘            └────────┬────────┘
//!                                           │
//!                                           ▼
//!                                  ┌─────────────────┐
//!                                  │     Storage     │
//!                                  │    (Mutex)      │
//!                                  └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod storage;
pub mod command;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ToyRedisError};
pub use config::Config;
pub use engine::Engine;
pub use protocol::Value;
pub use storage::Storage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of toyredis
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
