//! Performance benchmarks for vsx-registry.
//!
//! This module contains benchmarks for:
//! - Identifier normalization and parsing
//! - Search response decoding
//! - Readme rendering and sanitization
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vsx_registry::registry::render_readme;
use vsx_registry::{ExtensionId, ExtensionSummary, ExtensionUri};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    /// Generate a search response body with `count` extensions.
    pub fn generate_search_json(count: usize) -> String {
        let extensions: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"namespace":"Publisher{p}","name":"Extension{i}","version":"1.{i}.0","displayName":"Extension {i}","description":"Does thing number {i}","files":{{"icon":"https://cdn.test/{i}.png"}},"downloadCount":{i}}}"#,
                    p = i % 17,
                )
            })
            .collect();
        format!(r#"{{"extensions":[{}]}}"#, extensions.join(","))
    }

    /// Generate a readme with `sections` sections, each carrying some markup
    /// a sanitizer has to deal with.
    pub fn generate_readme(sections: usize) -> String {
        let mut readme = String::from("# Extension\n\nA realistic readme.\n\n");
        for i in 0..sections {
            readme.push_str(&format!(
                "## Section {i}\n\nSome *emphasis*, `code` and a [link](https://example.com/{i}).\n\n\
                 ![shot {i}](https://cdn.test/shot{i}.png)\n\n\
                 <div onclick=\"evil()\">inline html</div>\n\n\
                 <script>track({i})</script>\n\n\
                 | key | value |\n|-----|-------|\n| a | {i} |\n\n\
                 ```json\n{{ \"setting\": {i} }}\n```\n\n"
            ));
        }
        readme
    }
}

// ============================================================================
// Identifier Benchmarks
// ============================================================================

fn bench_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifiers");

    group.bench_function("normalize", |b| {
        b.iter(|| ExtensionId::new(black_box("Microsoft-Python"), black_box("Python.Debugger")));
    });

    group.bench_function("parse", |b| {
        b.iter(|| black_box("Microsoft-Python.Python.Debugger").parse::<ExtensionId>());
    });

    group.bench_function("uri_roundtrip", |b| {
        let uri = "vscode:extension/ms-python.python";
        b.iter(|| ExtensionUri::parse(black_box(uri)).map(|u| u.to_string()));
    });

    group.finish();
}

// ============================================================================
// Decoding Benchmarks
// ============================================================================

fn bench_search_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_decoding");

    for count in [10, 50, 200] {
        let body = fixtures::generate_search_json(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &body, |b, body| {
            b.iter(|| {
                let value: serde_json::Value = serde_json::from_str(black_box(body)).unwrap();
                let extensions: Vec<ExtensionSummary> =
                    serde_json::from_value(value["extensions"].clone()).unwrap();
                extensions.iter().map(ExtensionSummary::id).count()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Readme Benchmarks
// ============================================================================

fn bench_readme_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("readme_rendering");

    for sections in [1, 10, 50] {
        let readme = fixtures::generate_readme(sections);
        group.throughput(Throughput::Bytes(readme.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &readme, |b, readme| {
            b.iter(|| render_readme(black_box(readme)));
        });
    }

    group.finish();
}

criterion_group!(identifier_benches, bench_identifiers,);

criterion_group!(decoding_benches, bench_search_decoding,);

criterion_group!(readme_benches, bench_readme_rendering,);

criterion_main!(identifier_benches, decoding_benches, readme_benches,);
