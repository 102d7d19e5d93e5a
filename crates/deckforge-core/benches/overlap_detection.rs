use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use deckforge_core::prelude::*;
use deckforge_core::{analyze, deck_overlaps, samples};

fn random_slide(count: usize) -> Slide {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut b = SlideBuilder::new();
    for _ in 0..count {
        b.rect(Rect::new(
            rng.gen_range(0..11_000_000),
            rng.gen_range(0..6_000_000),
            rng.gen_range(10_000..1_500_000),
            rng.gen_range(10_000..1_000_000),
        ));
    }
    b.build()
}

fn bench_pairwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_overlaps");

    for count in [10, 50, 200] {
        let rects = random_slide(count).rects();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rects, |b, rects| {
            b.iter(|| black_box(find_overlaps(rects)));
        });
    }

    group.finish();
}

fn bench_deck(c: &mut Criterion) {
    let mut group = c.benchmark_group("deck");
    let pres = (0..30).fold(PresentationBuilder::new(12_192_000, 6_858_000), |p, _| {
        p.push(random_slide(40))
    });
    group.bench_function("deck_overlaps_30x40", |b| {
        b.iter(|| black_box(deck_overlaps(&pres)));
    });
    group.bench_function("analyze_30x40", |b| {
        b.iter(|| black_box(analyze(&pres)));
    });

    let spec = samples::SAMPLES[0].spec().expect("bundled deck parses");
    let cfg = BuildConfig::default();
    group.bench_function("render_case_competition", |b| {
        b.iter(|| black_box(render_deck(&spec, &cfg, std::path::Path::new("."))));
    });

    group.finish();
}

criterion_group!(benches, bench_pairwise, bench_deck);
criterion_main!(benches);
