//! Benchmarks for toyredis codec and dispatch

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use toyredis::protocol::{decode, encode, Value};
use toyredis::Engine;

fn mget_reply(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| Value::bulk(Bytes::from(format!("value-{}", i))))
            .collect(),
    )
}

fn codec_benchmarks(c: &mut Criterion) {
    let set = Value::command(["SET", "key:000042", "some moderately sized value"]);
    let set_wire = encode(&set);
    let reply = mget_reply(100);
    let reply_wire = encode(&reply);

    c.bench_function("encode_set_command", |b| b.iter(|| encode(black_box(&set))));
    c.bench_function("decode_set_command", |b| {
        b.iter(|| decode(black_box(&set_wire)).unwrap())
    });
    c.bench_function("encode_mget_reply_100", |b| {
        b.iter(|| encode(black_box(&reply)))
    });
    c.bench_function("decode_mget_reply_100", |b| {
        b.iter(|| decode(black_box(&reply_wire)).unwrap())
    });
}

fn dispatch_benchmarks(c: &mut Criterion) {
    let engine = Engine::new();
    engine
        .execute(Value::command(["SET", "hot", "value"]))
        .unwrap();

    c.bench_function("dispatch_get_hit", |b| {
        b.iter(|| engine.execute(black_box(Value::command(["GET", "hot"]))).unwrap())
    });
    c.bench_function("dispatch_set", |b| {
        b.iter(|| {
            engine
                .execute(black_box(Value::command(["SET", "hot", "value"])))
                .unwrap()
        })
    });
}

criterion_group!(benches, codec_benchmarks, dispatch_benchmarks);
criterion_main!(benches);
