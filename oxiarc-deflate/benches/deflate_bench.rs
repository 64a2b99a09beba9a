//! End-to-end DEFLATE compress/decompress throughput.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiarc_deflate::{deflate, inflate};
use std::hint::black_box;

fn generate_text_like(size: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

fn bench_deflate(c: &mut Criterion) {
    let mut group = c.benchmark_group("deflate_compress");
    for size in [4 * 1024, 64 * 1024, 1024 * 1024] {
        let data = generate_text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(deflate(black_box(data)).unwrap()));
        });
    }
    group.finish();
}

fn bench_inflate(c: &mut Criterion) {
    let mut group = c.benchmark_group("deflate_decompress");
    for size in [4 * 1024, 64 * 1024, 1024 * 1024] {
        let data = generate_text_like(size);
        let compressed = deflate(&data).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &compressed,
            |b, compressed| {
                b.iter(|| black_box(inflate(black_box(compressed)).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_deflate, bench_inflate);
criterion_main!(benches);
