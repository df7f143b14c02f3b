//! Criterion benchmarks for rust_async_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_async_logger::core::{render, LogEvent, RenderContext, ThreadLabelRegistry, WallTime};
use rust_async_logger::prelude::*;
use rust_async_logger::{debug, info};
use std::thread;
use tempfile::TempDir;

fn start(dir: &TempDir) -> Logger {
    Logger::builder()
        .log_dir(dir.path())
        .file_name("bench.log")
        .color(ColorMode::Never)
        .build()
        .expect("Failed to start logger")
}

// ============================================================================
// Format Interpreter Benchmarks
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));

    let mut labels = ThreadLabelRegistry::new();
    labels.register(thread::current().id(), "main");
    let ctx = RenderContext::new(&labels).with_colors(true);
    let now = WallTime::now();
    let event = LogEvent::new(
        LogLevel::Info,
        SourceLocation::new("src/server/listener.rs", "app::server::accept", 88),
        "accepted connection from 10.0.0.7:51234".to_string(),
    );

    group.bench_function("default_format", |b| {
        b.iter(|| black_box(render(black_box(DEFAULT_FORMAT), &event, &now, &ctx)));
    });

    group.bench_function("message_only", |b| {
        b.iter(|| black_box(render(black_box("$C$Z"), &event, &now, &ctx)));
    });

    group.finish();
}

// ============================================================================
// Enqueue Benchmarks
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(1));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = start(&temp_dir);

    group.bench_function("info_macro", |b| {
        b.iter(|| {
            info!(logger, "request {} served", black_box(42));
        });
    });

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            info!(logger, "{}", black_box("concurrent message"));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    logger.shutdown();
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = start(&temp_dir);
    logger.set_min_level(LogLevel::Warn);

    group.bench_function("filtered_debug", |b| {
        b.iter(|| {
            debug!(logger, "never formatted {}", black_box(1));
        });
    });

    group.finish();
    logger.shutdown();
}

criterion_group!(benches, bench_render, bench_enqueue, bench_level_filtering);

criterion_main!(benches);
