//! Storage Module
//!
//! The shared in-memory keyspace.
//!
//! ## Concurrency Model
//! One `Storage` per server process, shared by every connection thread
//! through an `Arc`. All access goes through a single mutex, and the
//! dispatcher holds it for the whole of one command, so a multi-key
//! command such as MSET is never interleaved with another command.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};

/// Key → value mapping that command handlers operate on
pub type Keyspace = HashMap<Bytes, Bytes>;

/// Process-wide key-value store
#[derive(Debug, Default)]
pub struct Storage {
    data: Mutex<Keyspace>,
}

impl Storage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the keyspace for the duration of one command
    pub fn lock(&self) -> MutexGuard<'_, Keyspace> {
        self.data.lock()
    }

    /// Get a copy of the value stored at `key`
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Store `value` at `key`, replacing any previous value
    pub fn set(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.data.lock().insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}
