use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use realign::alignment::{normalize, ratio, AlignmentConfig, HintStrategy, ReferenceText};
use realign::pipeline::{correct_segments, Segment};

/// Synthetic book and matching subtitles: every sentence becomes one lowercase segment
fn build_corpus(sentences: usize) -> (String, Vec<Segment>) {
    let mut reference = String::new();
    let mut segments = Vec::with_capacity(sentences);
    for i in 0..sentences {
        let sentence = format!(
            "\"Chapter {i} begins,\" she said, and the narrator continues with passage number {i}. "
        );
        reference.push_str(&sentence);
        if i % 20 == 19 {
            reference.push_str("\n\n");
        }
        segments.push(Segment::new(
            i as u64 + 1,
            "00:00:01,000 --> 00:00:02,000",
            format!(
                "chapter {i} begins she said and the narrator continues with passage number {i}"
            ),
        ));
    }
    (reference, segments)
}

/// Same corpus with the first word of every segment misheard so the fuzzy tier runs
fn misheard(segments: &[Segment]) -> Vec<Segment> {
    segments
        .iter()
        .map(|s| {
            let text = s.text.replacen("chapter", "chaptor", 1);
            Segment::new(s.sequence_index, s.timing.clone(), text)
        })
        .collect()
}

fn bench_normalization(c: &mut Criterion) {
    let (reference, _) = build_corpus(2_000);
    let mut group = c.benchmark_group("normalization");
    group.throughput(Throughput::Bytes(reference.len() as u64));

    group.bench_function("normalize_reference", |b| {
        b.iter(|| normalize(black_box(&reference)))
    });
    group.bench_function("reference_text_new", |b| {
        b.iter(|| ReferenceText::new(black_box(reference.as_str())))
    });

    let a: Vec<char> = "the quick brown fox jumps over the lazy dog".chars().collect();
    let bb: Vec<char> = "teh quikc brown fox jumsp over teh lazy dgo".chars().collect();
    group.bench_function("ratio_short", |b| b.iter(|| ratio(black_box(&a), black_box(&bb))));

    group.finish();
}

fn bench_correction(c: &mut Criterion) {
    let (reference_text, segments) = build_corpus(500);
    let reference = ReferenceText::new(reference_text);
    let noisy = misheard(&segments);

    let mut group = c.benchmark_group("correction");
    group.throughput(Throughput::Elements(segments.len() as u64));
    group.sample_size(20);

    let sequential = AlignmentConfig::default();
    group.bench_function("exact_sequential", |b| {
        b.iter_batched(
            || segments.clone(),
            |mut batch| correct_segments(&reference, &mut batch, &sequential, &|_| {}),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("fuzzy_sequential", |b| {
        b.iter_batched(
            || noisy.clone(),
            |mut batch| correct_segments(&reference, &mut batch, &sequential, &|_| {}),
            BatchSize::LargeInput,
        )
    });

    let chunked = AlignmentConfig {
        hint_strategy: HintStrategy::Chunked { chunks: num_cpus::get() },
        ..Default::default()
    };
    group.bench_function("exact_chunked", |b| {
        b.iter_batched(
            || segments.clone(),
            |mut batch| correct_segments(&reference, &mut batch, &chunked, &|_| {}),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_correction);
criterion_main!(benches);
