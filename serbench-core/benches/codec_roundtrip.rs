// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec microbenchmarks.
//!
//! Criterion cross-check of the built-in codecs' encode and decode cost on
//! each sample shape, independent of the scheduler.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serbench_core::{CodecAdapter, CodecRegistry, Format, Sample, SampleGenerator};

const SEED: u64 = 0x5EB;

fn setup() -> (Arc<[Sample]>, Vec<Box<dyn CodecAdapter>>) {
    let samples = SampleGenerator::new(SEED)
        .generate_shared(&[1, 2, 3])
        .expect("Failed to generate samples");
    let registry = CodecRegistry::builtin();
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    let codecs = Format::ALL
        .iter()
        .map(|format| {
            let mut codec = registry
                .create(format.name(), Arc::clone(&samples), std::env::temp_dir())
                .expect("Built-in format missing");
            runtime
                .block_on(codec.initialize())
                .expect("Failed to initialize codec");
            codec
        })
        .collect();

    (samples, codecs)
}

fn bench_encode(c: &mut Criterion) {
    let (samples, codecs) = setup();
    let mut group = c.benchmark_group("encode");
    group.measurement_time(Duration::from_secs(3));

    for codec in &codecs {
        for sample in samples.iter() {
            let size = codec.encode(sample).expect("encode failed").len();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(codec.format().as_str(), sample.struct_id),
                sample,
                |b, sample| b.iter(|| codec.encode(black_box(sample))),
            );
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let (samples, codecs) = setup();
    let mut group = c.benchmark_group("decode");
    group.measurement_time(Duration::from_secs(3));

    for codec in &codecs {
        for sample in samples.iter() {
            let payload = codec.encode(sample).expect("encode failed");
            group.throughput(Throughput::Bytes(payload.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(codec.format().as_str(), sample.struct_id),
                &payload,
                |b, payload| b.iter(|| codec.decode(sample.index, black_box(payload))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
