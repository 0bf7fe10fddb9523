// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for golden comparison.

use backend_runtime::ElementType;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use harness::compare_bytes;

const SIZES: [usize; 3] = [4 * 1024, 256 * 1024, 4 * 1024 * 1024];

fn noisy_pair(len: usize) -> (Vec<u8>, Vec<u8>) {
    let golden: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
    let live = golden
        .iter()
        .enumerate()
        .map(|(i, &b)| if i % 97 == 0 { b.wrapping_add(1) } else { b })
        .collect();
    (golden, live)
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_bytes");
    for &len in &SIZES {
        let (golden, live) = noisy_pair(len);
        group.throughput(Throughput::Bytes(len as u64));
        for element_type in [ElementType::Float32, ElementType::Float16, ElementType::UInt8] {
            group.bench_with_input(
                BenchmarkId::new(element_type.as_str(), len),
                &(&golden, &live),
                |b, (g, l)| {
                    b.iter(|| compare_bytes(element_type, black_box(g), black_box(l), 0.01))
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
