//! Command implementations
//!
//! Each handler runs with the keyspace already locked and its minimum
//! arity already checked by the dispatcher.

use bytes::Bytes;

use super::{CommandSpec, Reply};
use crate::storage::Keyspace;

pub(super) static BUILTIN_COMMANDS: [CommandSpec; 6] = [
    CommandSpec { name: "get", min_args: 1, handler: get },
    CommandSpec { name: "set", min_args: 2, handler: set },
    CommandSpec { name: "mget", min_args: 0, handler: mget },
    CommandSpec { name: "mset", min_args: 0, handler: mset },
    CommandSpec { name: "del", min_args: 0, handler: del },
    CommandSpec { name: "flushdb", min_args: 0, handler: flushdb },
];

fn get(db: &mut Keyspace, args: &[Bytes]) -> Reply {
    Reply::Bulk(args.first().and_then(|key| db.get(key)).cloned())
}

fn set(db: &mut Keyspace, args: &[Bytes]) -> Reply {
    if let [key, value, ..] = args {
        db.insert(key.clone(), value.clone());
    }
    Reply::Ok
}

fn mget(db: &mut Keyspace, args: &[Bytes]) -> Reply {
    Reply::Multi(args.iter().map(|key| db.get(key).cloned()).collect())
}

fn mset(db: &mut Keyspace, args: &[Bytes]) -> Reply {
    for pair in args.chunks_exact(2) {
        db.insert(pair[0].clone(), pair[1].clone());
    }
    Reply::Ok
}

/// Removes every listed key; only keys whose old value was non-empty are counted
fn del(db: &mut Keyspace, args: &[Bytes]) -> Reply {
    let removed = args
        .iter()
        .filter(|key| db.remove(*key).is_some_and(|old| !old.is_empty()))
        .count();
    Reply::Integer(removed as i64)
}

fn flushdb(db: &mut Keyspace, _args: &[Bytes]) -> Reply {
    db.clear();
    Reply::Ok
}
