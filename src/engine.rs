//! Engine Module
//!
//! Couples the shared storage with the command table.
//!
//! ## Responsibilities
//! - Own the process-wide `Storage` handle
//! - Build the command table once at startup
//! - Execute decoded requests on behalf of every connection

use std::sync::Arc;

use crate::command::{CommandError, CommandTable};
use crate::protocol::Value;
use crate::storage::Storage;

/// The request executor shared by all connections
///
/// ## Concurrency Model
///
/// Connections run on their own OS threads and call [`Engine::execute`]
/// concurrently. The command table is read-only after construction; the
/// keyspace is locked by the dispatcher for exactly one command at a time.
#[derive(Debug, Default)]
pub struct Engine {
    /// Keyspace shared with every connection
    storage: Arc<Storage>,

    /// Name → handler lookup
    commands: CommandTable,
}

impl Engine {
    /// Create an engine over an empty store
    pub fn new() -> Self {
        Self::with_storage(Arc::new(Storage::new()))
    }

    /// Create an engine over an existing store
    pub fn with_storage(storage: Arc<Storage>) -> Self {
        Self::with_commands(storage, CommandTable::new())
    }

    /// Create an engine with a custom command table
    pub fn with_commands(storage: Arc<Storage>, commands: CommandTable) -> Self {
        Self { storage, commands }
    }

    /// Execute one request
    ///
    /// Returns the reply value, or a recoverable command error that the
    /// caller reports to the client.
    pub fn execute(&self, request: Value) -> Result<Value, CommandError> {
        self.commands.dispatch(&self.storage, request)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the shared storage handle
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Get the command table
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }
}
