use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::{Circle, PackOptions, UnplaceablePolicy, pack};
use std::hint::black_box;
use std::time::Duration;

/// Targets spread over `span` with radii cycling through a few sizes.
fn build_circles(count: usize, span: f64) -> Vec<Circle> {
    (0..count)
        .map(|i| {
            let t = (i as f64 * 7.31).rem_euclid(span) + 1.0;
            let r = 0.5 + (i % 5) as f64 * 0.4;
            Circle::new(t, r)
        })
        .collect()
}

fn bench_linear_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_pack");
    group.measurement_time(Duration::from_secs(10));

    let opts = PackOptions {
        padding: 1.0,
        width: 1000.0,
        on_unplaceable: UnplaceablePolicy::Skip,
        ..Default::default()
    };

    // Narrow spans force large blocks; wide spans produce many small ones.
    let cases = [
        ("sparse_200", 200usize, 2000.0),
        ("dense_200", 200usize, 50.0),
        ("dense_800", 800usize, 100.0),
    ];

    for (name, count, span) in cases {
        let circles = build_circles(count, span);
        group.bench_with_input(BenchmarkId::new("pack", name), &circles, |b, circles| {
            b.iter_batched(
                || circles.clone(),
                |mut cs| {
                    let summary = pack(black_box(cs.as_mut_slice()), &opts);
                    black_box(summary.map(|s| s.placed).unwrap_or_default());
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_linear_pack);
criterion_main!(benches);
