//! Benchmarks for markdown ingestion.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mdi_core::{MarkdownOptions, MarkdownParser, ParseOptions, standard_editor};

/// Generate markdown with headings, paragraphs, lists and code.
fn generate_markdown(sections: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(sections * (100 + paragraphs_per_section * 120));
    md.push_str("# Document Title\n\n");

    for i in 0..sections {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} of section {i} has **bold**, *italic* and {{{{var_{j}}}}} text.\n\n"
            ));
        }
        md.push_str("- [x] done\n- [ ] todo\n\n");
        md.push_str("```rust\nfn main() {}\n```\n\n");
    }
    md
}

fn parser() -> MarkdownParser {
    MarkdownParser::new(
        standard_editor(),
        MarkdownOptions {
            ignore_regex: vec![r"\{\{[^}]*\}\}".to_owned()],
            ..MarkdownOptions::default()
        },
    )
    .unwrap()
}

fn bench_ingest_simple(c: &mut Criterion) {
    let parser = parser();

    c.bench_function("ingest_simple_markdown", |b| {
        b.iter(|| parser.parse_markdown("# Hello\n\nSimple content.", ParseOptions::BLOCK));
    });
}

fn bench_ingest_inline(c: &mut Criterion) {
    let parser = parser();

    c.bench_function("ingest_inline_snippet", |b| {
        b.iter(|| parser.parse_markdown("  some *inline* {{value}}  ", ParseOptions::INLINE));
    });
}

fn bench_ingest_varying_sizes(c: &mut Criterion) {
    let parser = parser();
    let mut group = c.benchmark_group("ingest_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(sections, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{sections}s_{paragraphs}p")),
            &markdown,
            |b, md| b.iter(|| parser.parse_markdown(md, ParseOptions::BLOCK)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ingest_simple,
    bench_ingest_inline,
    bench_ingest_varying_sizes
);
criterion_main!(benches);
