//! Benchmarks for the hot per-frame paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsebar::{
    AnimationController, EasingRegistry, LabelFormatter, ProgressWidget, Surface, TickTime,
    TweenSpec, WidgetOptions, WidgetRuntime,
};

fn controller_advance_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_advance");
    let registry = EasingRegistry::new();

    for easing in ["linear", "ease_in_out", "bezier", "spring"] {
        let mut controller = AnimationController::new();
        controller.start(TweenSpec {
            from: 0.0,
            to: 100.0,
            // Long enough that the tween never settles mid-run
            duration: TickTime::from_nanos(u64::MAX / 2),
            easing: registry.get(easing).expect("builtin easing"),
        });

        group.bench_with_input(BenchmarkId::from_parameter(easing), &easing, |b, _| {
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                let now = TickTime::from_nanos(tick * 1_000_000);
                black_box(controller.advance(black_box(now)))
            });
        });
    }

    group.finish();
}

fn frame_pass_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_pass");

    for count in [1usize, 16, 64] {
        let runtime = WidgetRuntime::new();
        let widgets: Vec<ProgressWidget> = (0..count)
            .map(|_| {
                ProgressWidget::new(
                    &runtime,
                    Surface::detached(),
                    WidgetOptions {
                        duration: 86_400_000,
                        easing: "ease_in_out".to_string(),
                        ..WidgetOptions::default()
                    },
                )
                .expect("widget construction")
            })
            .collect();
        for widget in &widgets {
            widget.set_value(100.0).expect("kick tween");
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                let now = TickTime::from_nanos(tick * 1_000_000);
                runtime.run_frame(black_box(now)).expect("frame pass");
            });
        });
    }

    group.finish();
}

fn label_format_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_format");

    group.bench_function("repeating_values", |b| {
        let mut formatter = LabelFormatter::new(64);
        formatter.configure("{value} of {max} ({percent}%)", 0.0, 100.0);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let value = (i % 10) as f64 * 10.0;
            black_box(formatter.format(black_box(value), value))
        });
    });

    group.bench_function("unique_values", |b| {
        let mut formatter = LabelFormatter::new(64);
        formatter.configure("{value} of {max} ({percent}%)", 0.0, 100.0);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let value = i as f64 * 0.001;
            black_box(formatter.format(black_box(value), value))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    controller_advance_benchmark,
    frame_pass_benchmark,
    label_format_benchmark
);
criterion_main!(benches);
