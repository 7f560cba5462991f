use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phonosim_core::{
    deduplicate, FeatureInventory, FeatureValue, NaturalClassEnumerator, Segment,
    SharedClassScorer, SimilarityMatrix,
};

/// Deterministic inventory with every segment distinct in at least one feature.
fn synthetic_inventory(features: usize, segments: usize) -> FeatureInventory {
    let names = (0..features).map(|i| format!("f{i}")).collect();
    let segments = (0..segments)
        .map(|s| {
            let values = (0..features)
                .map(|f| match (s / 3usize.pow((f % 6) as u32) + f) % 3 {
                    0 => FeatureValue::Positive,
                    1 => FeatureValue::Negative,
                    _ => FeatureValue::Unspecified,
                })
                .collect();
            Segment::new(format!("s{s}"), values)
        })
        .collect();
    FeatureInventory::new(names, segments).expect("valid synthetic inventory")
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");
    group.sample_size(10);
    for features in [6, 8, 10] {
        let inventory = synthetic_inventory(features, 30);
        group.bench_with_input(BenchmarkId::from_parameter(features), &inventory, |b, inv| {
            b.iter(|| {
                let classes = NaturalClassEnumerator::new(inv)
                    .enumerate(|_| {})
                    .expect("enumeration");
                black_box(deduplicate(&classes))
            })
        });
    }
    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let inventory = synthetic_inventory(8, 30);
    let classes = deduplicate(
        &NaturalClassEnumerator::new(&inventory)
            .enumerate(|_| {})
            .expect("enumeration"),
    );
    let scorer = SharedClassScorer::new(&classes);
    let labels = inventory.labels();

    c.bench_function("similarity_matrix_30", |b| {
        b.iter(|| black_box(SimilarityMatrix::build(&labels, &scorer)))
    });
}

criterion_group!(benches, bench_enumeration, bench_matrix);
criterion_main!(benches);
