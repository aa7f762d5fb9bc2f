use std::hint::black_box;
use std::time::Instant;

use glam::Vec2;
use ringlife_common::{AutomatonConfig, FieldSize};
use ringlife_kernel::{Automaton, ConvolutionKernel, RecordingEngine, paint_region};

fn bench_kernel_build(size: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(ConvolutionKernel::ring(black_box(size), black_box(size)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  ring kernel ({size}x{size}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_paint_region(field: FieldSize, radius: f32, iterations: usize) {
    let start = Instant::now();
    for i in 0..iterations {
        let at = Vec2::new((i % field.width as usize) as f32, (i / 7 % field.height as usize) as f32);
        let _ = black_box(paint_region(black_box(field), black_box(at), radius, 1.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  paint region ({field}, r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_recorded_ticks(ticks: usize) {
    let engine = RecordingEngine::new();
    let log = engine.log();
    let mut automaton = match Automaton::new(engine, &AutomatonConfig::default()) {
        Ok(a) => a,
        Err(e) => {
            println!("  startup failed: {e}");
            return;
        }
    };

    let start = Instant::now();
    for i in 0..ticks {
        let paint = (i % 3 == 0).then_some(Vec2::new(512.0, 512.0));
        let _ = black_box(automaton.tick(black_box(paint)));
        if i % 1000 == 0 {
            log.drain();
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / ticks as u32;
    println!("  recorded tick ({ticks} ticks): {per_iter:?}/tick, total {elapsed:?}");
}

fn main() {
    println!("=== Kernel Benchmarks ===\n");

    println!("Kernel construction:");
    bench_kernel_build(25, 10_000);
    bench_kernel_build(64, 1_000);

    println!("\nPaint region:");
    bench_paint_region(FieldSize::new(320, 320), 10.0, 100_000);
    bench_paint_region(FieldSize::new(1024, 1024), 200.0, 100_000);

    println!("\nFrame protocol (recording engine):");
    bench_recorded_ticks(10_000);
    bench_recorded_ticks(100_000);

    println!("\n=== Done ===");
}
