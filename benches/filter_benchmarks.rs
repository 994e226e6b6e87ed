//! Benchmarks for filter performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_gallery::filters::{
    kalman::{KalmanCursorFilter, KalmanParams, ScalarKalman},
    CursorFilter, Passthrough,
};

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    // Test data - simulating a jittery fingertip sweeping across the frame
    let test_data: Vec<(f64, f64)> = (0..100)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            let x = 320.0 + 200.0 * t.sin() + 4.0 * rand::random::<f64>();
            let y = 240.0 + 150.0 * t.cos() + 4.0 * rand::random::<f64>();
            (x, y)
        })
        .collect();

    let filter_configs = vec![
        ("no_filter", Box::new(Passthrough) as Box<dyn CursorFilter>),
        ("kalman_default", Box::new(KalmanCursorFilter::new(KalmanParams::default()))),
        (
            "kalman_heavy",
            Box::new(KalmanCursorFilter::new(KalmanParams {
                measurement_noise: 25.0,
                process_noise: 0.5,
                ..KalmanParams::default()
            })),
        ),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("single_update", name), &test_data[0], |b, &(x, y)| {
            b.iter(|| black_box(filter.apply(black_box(x), black_box(y))));
        });

        filter.reset();
        group.bench_with_input(BenchmarkId::new("sequence_100", name), &test_data, |b, data| {
            b.iter(|| {
                filter.reset();
                for &(x, y) in data {
                    black_box(filter.apply(x, y));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_scalar_kalman(c: &mut Criterion) {
    c.bench_function("scalar_kalman_1000", |b| {
        let mut kf = ScalarKalman::default();
        b.iter(|| {
            for i in 0..1000 {
                black_box(kf.filter(black_box(f64::from(i % 640))));
            }
        });
    });
}

criterion_group!(benches, benchmark_filters, benchmark_scalar_kalman);
criterion_main!(benches);
