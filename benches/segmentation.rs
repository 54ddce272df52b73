//! Benchmarks for segmentation strategies.

#![allow(missing_docs, clippy::unwrap_used)]

use chunkstream::chunking::{
    ParagraphStrategy, SegmentStrategy, Segmenter, StructuralStrategy, WindowedStrategy,
};
use chunkstream::core::ChunkBudget;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const SENTENCE: &str = "The committee reviewed the proposal in detail. Several members raised concerns! ";

/// Plain prose with no paragraph breaks.
fn prose(size: usize) -> String {
    SENTENCE.repeat(size / SENTENCE.len() + 1)
}

/// Prose broken into blank-line separated paragraphs.
fn paragraphs(size: usize) -> String {
    let paragraph = SENTENCE.repeat(6);
    let count = size / paragraph.len() + 1;
    vec![paragraph; count].join("\n\n")
}

/// Prose under markdown chapter headings.
fn chapters(size: usize) -> String {
    let chapter = SENTENCE.repeat(40);
    (1..=size / chapter.len() + 1)
        .map(|n| format!("## Chapter {n}\n\n{chapter}\n"))
        .collect()
}

fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    let budget = ChunkBudget::default();
    let size = 1024 * 1024;

    let cases: [(&str, String, Box<dyn SegmentStrategy>); 3] = [
        ("windowed", prose(size), Box::new(WindowedStrategy)),
        ("paragraph", paragraphs(size), Box::new(ParagraphStrategy)),
        ("structural", chapters(size), Box::new(StructuralStrategy)),
    ];

    for (name, text, strategy) in &cases {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| strategy.split(black_box(text), &budget));
        });
    }

    group.finish();
}

fn benchmark_segmenter_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmenter");
    let segmenter = Segmenter::new();

    for max_size in [2_000usize, 12_000, 48_000] {
        let budget = ChunkBudget::new(max_size, 50).unwrap();
        let text = prose(4 * 1024 * 1024);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(max_size), &text, |b, text| {
            b.iter(|| segmenter.segment(black_box(text), &budget));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_strategies, benchmark_segmenter_sizes);
criterion_main!(benches);
