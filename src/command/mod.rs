//! Command Module
//!
//! Turns a decoded request into a reply.
//!
//! ## Responsibilities
//! - Validate the request shape (non-empty array of bulk strings)
//! - Resolve the case-normalized command name through a table built once at startup
//! - Check arity, then run the handler against shared storage under its lock
//!
//! ## Commands
//! - GET key            → bulk string or null
//! - SET key value      → OK (extra arguments ignored)
//! - MGET key...        → array of bulk string or null, in request order
//! - MSET (key value)+  → OK (an unpaired trailing key is dropped)
//! - DEL key...         → integer count of removed keys holding a non-empty value
//! - FLUSHDB            → OK

mod handlers;

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::Value;
use crate::storage::{Keyspace, Storage};

/// Handler signature shared by every command
pub type Handler = fn(&mut Keyspace, &[Bytes]) -> Reply;

/// Recoverable command failures; the connection stays open
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The request is not a well-formed command
    #[error("{0}")]
    Malformed(String),

    /// No handler is registered under this (normalized) name
    #[error("command not implemented: {0}")]
    NotImplemented(String),
}

/// Result of a handler, before it is mapped onto the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Integer(i64),
    Bulk(Option<Bytes>),
    Multi(Vec<Option<Bytes>>),
}

impl From<Reply> for Value {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Ok => Value::ok(),
            Reply::Integer(n) => Value::Integer(n),
            Reply::Bulk(data) => data.into(),
            Reply::Multi(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

/// A validated request: name followed by raw byte-string arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    parts: Vec<Bytes>,
}

impl Command {
    /// Raw command name as sent by the client
    pub fn name(&self) -> &Bytes {
        &self.parts[0]
    }

    /// Lowercased name used for lookup
    pub fn normalized_name(&self) -> String {
        String::from_utf8_lossy(self.name()).to_ascii_lowercase()
    }

    pub fn args(&self) -> &[Bytes] {
        &self.parts[1..]
    }
}

impl TryFrom<Value> for Command {
    type Error = CommandError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(CommandError::Malformed("command is not iterable".to_string())),
        };

        let parts = items
            .into_iter()
            .map(|item| match item {
                Value::BulkString(data) => Ok(data),
                _ => Err(CommandError::Malformed(
                    "command name/arguments are not bytes".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts })
    }
}

/// Metadata and callback for one command table entry
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Lowercase command name
    pub name: &'static str,

    /// Minimum number of arguments after the name
    pub min_args: usize,

    pub handler: Handler,
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .finish_non_exhaustive()
    }
}

/// Name → handler mapping, built once and shared by all connections
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<&'static str, CommandSpec>,
}

impl CommandTable {
    /// Build the table with every supported command registered
    pub fn new() -> Self {
        let commands = handlers::BUILTIN_COMMANDS
            .iter()
            .map(|spec| (spec.name, *spec))
            .collect();
        Self { commands }
    }

    /// Add or replace a command
    pub fn register(&mut self, spec: CommandSpec) {
        self.commands.insert(spec.name, spec);
    }

    /// Look up a command by its lowercase name
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Validate, resolve and execute one request
    ///
    /// The storage lock is held only while the handler runs, so each command
    /// is applied atomically with respect to every other connection.
    pub fn dispatch(&self, storage: &Storage, request: Value) -> Result<Value, CommandError> {
        let command = Command::try_from(request)?;
        let name = command.normalized_name();

        let spec = self
            .get(&name)
            .ok_or_else(|| CommandError::NotImplemented(name.clone()))?;

        if command.args().len() < spec.min_args {
            return Err(CommandError::Malformed(format!(
                "wrong number of arguments for '{}' command",
                spec.name
            )));
        }

        let reply = {
            let mut keyspace = storage.lock();
            (spec.handler)(&mut keyspace, command.args())
        };
        Ok(reply.into())
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}
