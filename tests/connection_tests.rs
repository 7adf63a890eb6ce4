//! Connection Loop Tests
//!
//! Drives `Connection` over an in-memory byte source and sink.
//!
//! These tests verify:
//! - The decode → dispatch → encode cycle, one request at a time
//! - Command errors are reported and the connection stays open
//! - Framing errors are reported and then close the connection
//! - Panicking handlers become internal errors

use std::io::{self, Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use toyredis::command::{CommandSpec, CommandTable, Reply};
use toyredis::network::Connection;
use toyredis::protocol::{encode, DecodeError, Decoder, Value};
use toyredis::storage::Keyspace;
use toyredis::{Config, Engine, Storage, ToyRedisError};

// =============================================================================
// Helper Functions
// =============================================================================

fn requests(commands: &[&[&'static str]]) -> Vec<u8> {
    commands
        .iter()
        .flat_map(|parts| encode(&Value::command(parts.iter().copied())).to_vec())
        .collect()
}

/// Serve `input` to completion and return the result plus every reply sent
fn serve(
    engine: Arc<Engine>,
    config: &Config,
    input: Vec<u8>,
) -> (toyredis::Result<()>, Vec<Value>) {
    let mut output = Vec::new();
    let result = {
        let mut connection = Connection::new(Cursor::new(input), &mut output, engine, config);
        connection.handle()
    };

    let mut decoder = Decoder::new(Cursor::new(output));
    let mut replies = Vec::new();
    while let Some(value) = decoder.read_value().unwrap() {
        replies.push(value);
    }
    (result, replies)
}

fn serve_default(input: Vec<u8>) -> (toyredis::Result<()>, Vec<Value>) {
    serve(Arc::new(Engine::new()), &Config::default(), input)
}

fn error_text(value: &Value) -> &str {
    match value {
        Value::Error(message) => message,
        other => panic!("Expected error reply, got {:?}", other),
    }
}

fn boom(_db: &mut Keyspace, _args: &[Bytes]) -> Reply {
    panic!("handler exploded")
}

/// Sink whose peer has already gone away
struct ClosedSink;

impl Write for ClosedSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Request Cycle Tests
// =============================================================================

#[test]
fn test_set_get_del_get() {
    let input = requests(&[
        &["SET", "foo", "bar"],
        &["GET", "foo"],
        &["DEL", "foo"],
        &["GET", "foo"],
    ]);

    let (result, replies) = serve_default(input);

    assert!(result.is_ok());
    assert_eq!(
        replies,
        vec![
            Value::ok(),
            Value::bulk("bar"),
            Value::Integer(1),
            Value::Null,
        ]
    );
}

#[test]
fn test_mset_mget_over_connection() {
    let input = requests(&[&["MSET", "k1", "v1", "k2", "v2"], &["MGET", "k1", "k2"]]);

    let (_, replies) = serve_default(input);

    assert_eq!(
        replies[1],
        Value::Array(vec![Value::bulk("v1"), Value::bulk("v2")])
    );
}

#[test]
fn test_empty_input_closes_quietly() {
    let (result, replies) = serve_default(Vec::new());

    assert!(result.is_ok());
    assert!(replies.is_empty());
}

#[test]
fn test_storage_is_shared_between_connections() {
    let engine = Arc::new(Engine::new());
    let config = Config::default();

    serve(Arc::clone(&engine), &config, requests(&[&["SET", "shared", "yes"]]));
    let (_, replies) = serve(engine, &config, requests(&[&["GET", "shared"]]));

    assert_eq!(replies, vec![Value::bulk("yes")]);
}

// =============================================================================
// Command Error Tests
// =============================================================================

#[test]
fn test_unknown_command_keeps_connection_open() {
    let input = requests(&[&["INVALID", "x"], &["GET", "x"]]);

    let (result, replies) = serve_default(input);

    assert!(result.is_ok());
    assert_eq!(replies.len(), 2);
    assert_eq!(error_text(&replies[0]), "ERR command not implemented: invalid");
    assert_eq!(replies[1], Value::Null);
}

#[test]
fn test_non_command_frame_is_reported() {
    let mut input = b":1\r\n".to_vec();
    input.extend(requests(&[&["GET", "x"]]));

    let (result, replies) = serve_default(input);

    assert!(result.is_ok());
    assert_eq!(error_text(&replies[0]), "ERR command is not iterable");
    assert_eq!(replies[1], Value::Null);
}

#[test]
fn test_wrong_arity_is_reported() {
    let (result, replies) = serve_default(requests(&[&["GET"]]));

    assert!(result.is_ok());
    assert_eq!(
        error_text(&replies[0]),
        "ERR wrong number of arguments for 'get' command"
    );
}

#[test]
fn test_command_name_with_line_break_cannot_break_framing() {
    let (_, replies) = serve_default(requests(&[&["BAD\r\nNAME"]]));

    assert_eq!(replies.len(), 1);
    assert_eq!(error_text(&replies[0]), "ERR command not implemented: bad  name");
}

#[test]
fn test_panicking_handler_is_internal_error() {
    let mut commands = CommandTable::new();
    commands.register(CommandSpec {
        name: "boom",
        min_args: 0,
        handler: boom,
    });
    let engine = Arc::new(Engine::with_commands(Arc::new(Storage::new()), commands));

    let input = requests(&[&["BOOM"], &["SET", "after", "ok"], &["GET", "after"]]);
    let (result, replies) = serve(engine, &Config::default(), input);

    assert!(result.is_ok());
    assert_eq!(error_text(&replies[0]), "ERR internal error");
    assert_eq!(replies[1], Value::ok());
    assert_eq!(replies[2], Value::bulk("ok"));
}

// =============================================================================
// Framing Error Tests
// =============================================================================

#[test]
fn test_malformed_prefix_reports_and_closes() {
    let mut input = requests(&[&["SET", "foo", "bar"]]);
    input.extend_from_slice(b"%garbage\r\n");
    input.extend(requests(&[&["DEL", "foo"]]));

    let engine = Arc::new(Engine::new());
    let (result, replies) = serve(Arc::clone(&engine), &Config::default(), input);

    assert!(matches!(
        result,
        Err(ToyRedisError::Decode(DecodeError::MalformedPrefix(b'%')))
    ));
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], Value::ok());
    assert!(error_text(&replies[1]).starts_with("ERR protocol error"));

    // Nothing after the corrupt frame was executed
    assert_eq!(engine.storage().get(b"foo"), Some(Bytes::from("bar")));
}

#[test]
fn test_truncated_request_reports_and_closes() {
    let (result, replies) = serve_default(b"*2\r\n$3\r\nGET\r\n".to_vec());

    assert!(matches!(
        result,
        Err(ToyRedisError::Decode(DecodeError::MissingTerminator))
    ));
    assert_eq!(replies.len(), 1);
    assert_eq!(error_text(&replies[0]), "ERR protocol error: missing separator");
}

#[test]
fn test_oversized_request_reports_and_closes() {
    let config = Config::builder().max_line_length(16).build();
    let input = format!("+{}\r\n", "x".repeat(64)).into_bytes();

    let (result, replies) = serve(Arc::new(Engine::new()), &config, input);

    assert!(matches!(
        result,
        Err(ToyRedisError::Decode(DecodeError::OversizedRequest { limit: 16 }))
    ));
    assert!(error_text(&replies[0]).starts_with("ERR protocol error: request is too big"));
}

// =============================================================================
// Write Failure Tests
// =============================================================================

#[test]
fn test_peer_gone_on_write_is_clean_close() {
    let engine = Arc::new(Engine::new());
    let input = requests(&[&["SET", "foo", "bar"], &["GET", "foo"]]);

    let mut connection = Connection::new(
        Cursor::new(input),
        ClosedSink,
        Arc::clone(&engine),
        &Config::default(),
    );

    assert!(connection.handle().is_ok());
    // The first command still ran before the reply failed
    assert_eq!(engine.storage().get(b"foo"), Some(Bytes::from("bar")));
}
