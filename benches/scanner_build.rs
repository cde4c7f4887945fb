//! Scaling benchmarks for parser selection and scanner construction.
//!
//! Measures filter resolution, specification store construction and scanner
//! compilation with registries ranging from a handful of parsers to several
//! thousand, plus a single scan pass over a synthetic buffer.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parser_registry::{FormatSpecification, Parser, ParserDescriptor, ParsersManager};
use std::hint::black_box;

struct BenchParser;

impl Parser for BenchParser {
    fn name(&self) -> &str {
        "bench"
    }
}

fn build_manager(parser_count: usize) -> anyhow::Result<ParsersManager> {
    let mut manager = ParsersManager::new();
    let mut descriptors = Vec::with_capacity(parser_count);

    for i in 0..parser_count {
        let name = format!("parser_{i:05}");
        let mut descriptor = ParserDescriptor::new(name.clone(), || Box::new(BenchParser));

        // Two thirds of the parsers carry signatures, alternating anchors.
        if i % 3 != 0 {
            let mut spec = FormatSpecification::new(name.clone());
            let offset = match i % 4 {
                0 => None,
                1 => Some(0),
                2 => Some(16),
                _ => Some(-8),
            };
            spec.add_new_signature(format!("MAGIC{i:05}").into_bytes(), offset)?;
            descriptor = descriptor.with_format_specification(spec);
        }
        if i % 10 == 0 {
            descriptor = descriptor.with_plugins(&[format!("plugin_{i:05}")]);
        }
        descriptors.push(descriptor);
    }

    manager.register_parsers(descriptors)?;
    Ok(manager)
}

fn exclusion_filter(parser_count: usize) -> String {
    (0..parser_count)
        .step_by(7)
        .map(|i| format!("-parser_{i:05}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    for parser_count in [10, 100, 1_000, 5_000] {
        let manager = build_manager(parser_count).expect("benchmark registry");
        let filter = exclusion_filter(parser_count);

        group.bench_with_input(
            BenchmarkId::new("select_all", parser_count),
            &parser_count,
            |b, _| b.iter(|| black_box(manager.select_parser_names(None))),
        );

        group.bench_with_input(
            BenchmarkId::new("select_with_exclusions", parser_count),
            &filter,
            |b, filter| {
                b.iter(|| black_box(manager.select_parser_names(Some(filter.as_str()))))
            },
        );
    }

    group.finish();
}

fn bench_scanner_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner_build");
    group.sample_size(20);

    for parser_count in [10, 100, 1_000, 5_000] {
        let manager = build_manager(parser_count).expect("benchmark registry");

        group.bench_with_input(
            BenchmarkId::new("specification_store", parser_count),
            &parser_count,
            |b, _| b.iter(|| black_box(manager.build_specification_store(None).unwrap())),
        );

        let split = manager
            .build_specification_store(None)
            .expect("specification store");
        group.bench_with_input(
            BenchmarkId::new("compile", parser_count),
            &split.store,
            |b, store| b.iter(|| black_box(manager.build_scanner(store).unwrap())),
        );
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let data: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    group.throughput(Throughput::Bytes(data.len() as u64));

    for parser_count in [100, 1_000, 5_000] {
        let manager = build_manager(parser_count).expect("benchmark registry");
        let (scanner, _) = manager.scanner_for_filter(None).expect("scanner");

        group.bench_with_input(
            BenchmarkId::new("scan_64k", parser_count),
            &data,
            |b, data| b.iter(|| black_box(scanner.scan(data))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_selection, bench_scanner_build, bench_scan);
criterion_main!(benches);
