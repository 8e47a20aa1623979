use std::hint::black_box;
use std::ops::ControlFlow;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use em_wave::animation::{AnimationDriver, Timeline};
use em_wave::fields::{Polarization, WaveParameters};
use em_wave::grid::SampleGrid;
use em_wave::io::write_frames_csv;
use em_wave::materials::PRESETS;

fn circular_wave() -> WaveParameters {
    WaveParameters::builder()
        .polarization(Polarization::CircularRight)
        .build()
        .expect("default parameters are valid")
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let params = circular_wave();
    for points in [200, 2_000, 20_000] {
        let grid = SampleGrid::linspace(0.0, 4.0, points).expect("valid grid");
        group.bench_function(BenchmarkId::new("circular_right", points), |b| {
            b.iter(|| black_box(params.snapshot(&grid, black_box(0.37))))
        });
    }
    group.finish();
}

fn bench_comparison_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison_pass");
    let base = circular_wave();
    let waves: Vec<_> = PRESETS.iter().map(|m| base.in_medium(m.clone())).collect();
    let grid = SampleGrid::linspace(0.0, 4.0, 200).expect("valid grid");
    let timeline = Timeline::new(8.0, 30).expect("valid timeline");
    let driver = AnimationDriver::comparison(waves, grid, timeline).expect("non-empty comparison");

    group.bench_function(BenchmarkId::new("frames", driver.frame_count()), |b| {
        b.iter(|| {
            driver.for_each_frame(|frame| {
                black_box(frame);
                ControlFlow::Continue(())
            })
        })
    });
    group.bench_function(BenchmarkId::new("csv", driver.frame_count()), |b| {
        b.iter_batched(
            || Vec::with_capacity(1 << 24),
            |mut out| {
                write_frames_csv(&mut out, &driver).expect("in-memory csv write");
                out
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_snapshot, bench_comparison_pass);
criterion_main!(benches);
