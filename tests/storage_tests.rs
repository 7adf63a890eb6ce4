//! Storage Tests
//!
//! Tests verify:
//! - Basic get/set
//! - Locked access through the keyspace guard
//! - Sharing across threads

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use toyredis::Storage;

#[test]
fn test_new_storage_is_empty() {
    let storage = Storage::new();
    assert!(storage.is_empty());
    assert_eq!(storage.len(), 0);
}

#[test]
fn test_set_and_get() {
    let storage = Storage::new();

    storage.set("key1", "value1");

    assert_eq!(storage.get(b"key1"), Some(Bytes::from("value1")));
    assert_eq!(storage.get(b"nonexistent"), None);
}

#[test]
fn test_set_overwrites_existing() {
    let storage = Storage::new();

    storage.set("key1", "value1");
    storage.set("key1", "value2");

    assert_eq!(storage.len(), 1);
    assert_eq!(storage.get(b"key1"), Some(Bytes::from("value2")));
}

#[test]
fn test_binary_keys_and_values() {
    let storage = Storage::new();
    let key = Bytes::from_static(&[0x00, 0xFF, 0x0D, 0x0A]);
    let value: Bytes = (0..=255u8).collect::<Vec<_>>().into();

    storage.set(key.clone(), value.clone());

    assert_eq!(storage.get(&key), Some(value));
}

#[test]
fn test_lock_gives_direct_keyspace_access() {
    let storage = Storage::new();

    {
        let mut keyspace = storage.lock();
        keyspace.insert(Bytes::from("a"), Bytes::from("1"));
        keyspace.insert(Bytes::from("b"), Bytes::from("2"));
    }

    assert_eq!(storage.len(), 2);
    storage.lock().clear();
    assert!(storage.is_empty());
}

#[test]
fn test_concurrent_writers() {
    let storage = Arc::new(Storage::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for i in 0..100 {
                    storage.set(format!("{}-{}", t, i), "v");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.len(), 800);
}
