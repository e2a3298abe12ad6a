//! Criterion benchmarks for the frame codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package pjctl-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pjctl_core::protocol::frame::{
    decode_command, encode_command, strip_known_markers, OPERATION, UNIT_ADDRESS,
};
use pjctl_core::{Command, CommandRegistry, JvcRegistry};

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_command", |b| {
        b.iter(|| encode_command(black_box(OPERATION), &UNIT_ADDRESS, black_box(b"PMPM0B")))
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = encode_command(OPERATION, &UNIT_ADDRESS, b"PMPM0B");
    c.bench_function("decode_command", |b| b.iter(|| decode_command(black_box(&bytes))));
}

fn bench_strip(c: &mut Criterion) {
    let response = b"\x06\x89\x01PM\n@\x89\x01PM0B\n";
    c.bench_function("strip_known_markers", |b| {
        b.iter(|| strip_known_markers(black_box(response)))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let registry = JvcRegistry::new();
    let command = Command::operation("picture_mode", "frame_adapt_hdr3");
    c.bench_function("registry_lookup", |b| b.iter(|| registry.lookup(black_box(&command))));
}

criterion_group!(benches, bench_encode, bench_decode, bench_strip, bench_lookup);
criterion_main!(benches);
