//! Benchmarks for the cracker hot paths.
//!
//! The scan loops hash nothing longer than 20 bytes, so what matters here is
//! per-call overhead rather than bulk throughput:
//! - CRC-32 of short decimal strings
//! - the uid-to-decimal conversion
//! - a single GF(2) matrix apply (one per MITM iteration)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dmtrace_core::crc::{Crc32, UID_DIGITS_MAX, crc32_pad8, uid_to_decimal};
use dmtrace_core::gf2::Gf2Matrix;
use std::hint::black_box;

fn bench_crc32_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_decimal");

    for &uid in &[7u64, 2_199_999_999, 3_546_921_440_381_311] {
        let digits = uid.to_string();
        group.throughput(Throughput::Bytes(digits.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(digits.len()), &uid, |b, &uid| {
            let mut buf = [0u8; UID_DIGITS_MAX];
            b.iter(|| {
                let len = uid_to_decimal(black_box(uid), &mut buf);
                Crc32::compute(&buf[..len])
            });
        });
    }

    group.finish();
}

fn bench_uid_to_decimal(c: &mut Criterion) {
    c.bench_function("uid_to_decimal", |b| {
        let mut buf = [0u8; UID_DIGITS_MAX];
        b.iter(|| uid_to_decimal(black_box(3_546_921_440_381_311), &mut buf));
    });
}

fn bench_crc32_pad8(c: &mut Criterion) {
    c.bench_function("crc32_pad8", |b| {
        b.iter(|| crc32_pad8(black_box(40_381_311)));
    });
}

fn bench_matrix(c: &mut Criterion) {
    let m8 = Gf2Matrix::shift8();
    c.bench_function("gf2_apply", |b| {
        b.iter(|| m8.apply(black_box(0x68947c4d)));
    });
    c.bench_function("gf2_shift8_build", |b| {
        b.iter(Gf2Matrix::shift8);
    });
}

criterion_group!(
    benches,
    bench_crc32_decimal,
    bench_uid_to_decimal,
    bench_crc32_pad8,
    bench_matrix
);
criterion_main!(benches);
