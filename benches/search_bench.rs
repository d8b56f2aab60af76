use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lectern::{Analyzer, Document, EngineConfig, FieldOptions, Schema, SearchEngine};

const WORDS: [&str; 12] = [
    "flow", "wing", "shock", "laminar", "turbulent", "pressure", "boundary", "layer", "heat",
    "nozzle", "airfoil", "viscous",
];

fn make_doc(i: usize) -> Document {
    let title = format!("{} {}", WORDS[i % WORDS.len()], WORDS[(i / 3) % WORDS.len()]);
    let content: Vec<&str> = (0..40).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
    Document::new()
        .with("id", i as u64)
        .with("title", title)
        .with("content", content.join(" "))
}

fn build_engine(doc_count: usize) -> SearchEngine {
    let schema = Schema::builder()
        .field("id", FieldOptions::keyword().stored())
        .field("title", FieldOptions::text().stored())
        .field("content", FieldOptions::text().stored())
        .build()
        .unwrap();
    let engine = SearchEngine::new(schema, EngineConfig::default());
    engine
        .index_documents((0..doc_count).map(make_doc))
        .unwrap();
    engine
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::standard();
    let text = make_doc(7).get_str("content").unwrap().to_string();

    c.bench_function("analyze_40_words", |b| {
        b.iter(|| black_box(analyzer.terms(black_box(&text))));
    });
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_documents");
    for count in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(build_engine(count)));
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let counts = [1_000usize, 10_000];
    let envs: Vec<(usize, SearchEngine)> = counts.iter().map(|&n| (n, build_engine(n))).collect();

    let mut group = c.benchmark_group("query");
    for (count, engine) in envs.iter() {
        group.bench_with_input(BenchmarkId::new("plain", count), engine, |b, engine| {
            b.iter(|| {
                black_box(
                    engine
                        .query("turbulent boundary layer", &["title", "content"], false)
                        .unwrap(),
                );
            });
        });
        group.bench_with_input(BenchmarkId::new("highlight", count), engine, |b, engine| {
            b.iter(|| {
                black_box(
                    engine
                        .query("turbulent boundary layer", &["title", "content"], true)
                        .unwrap(),
                );
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze, bench_indexing, bench_query);
criterion_main!(benches);
