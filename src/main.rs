mod compositor;
mod gpu;
mod grid;
mod interactive;
mod lighting_grid;
mod occlusion;
mod scheduler;
mod variants;

#[cfg(test)]
mod tests;

// Re-export public API
pub use compositor::{LightingMode, OverlayCompositor, ShadeTarget};
pub use grid::BaseGrid;
pub use interactive::{GpuViewerConfig, OverlayViewer, ViewerConfig, run_gpu_viewer};
pub use lighting_grid::{CellShade, LightingGrid};
pub use occlusion::{occlusion_at, variant_index};
pub use scheduler::{IncrementalScheduler, TickReport, Traversal, full_shade_par};
pub use variants::{Tint, VARIANT_COUNT, VariantBank, VariantBankError, shadow_tints};

fn main() {
    // Check for command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--interactive" {
        run_interactive();
    } else if args.len() > 1 && args[1] == "--gpu" {
        run_gpu();
    } else if args.len() > 1 && args[1] == "--benchmark" {
        run_benchmark();
    } else {
        println!("Tileshade");
        println!("Run with --interactive for the minifb viewer");
        println!("Run with --gpu for the wgpu viewer");
        println!("Run with --benchmark to time incremental vs full rebuilds");
    }
}

fn run_interactive() {
    let config = ViewerConfig::default();

    match OverlayViewer::new(config) {
        Ok(mut viewer) => {
            if let Err(e) = viewer.run() {
                eprintln!("Error: {}", e);
            }
        }
        Err(e) => {
            eprintln!("Failed to create viewer: {}", e);
        }
    }
}

fn run_gpu() {
    if let Err(e) = run_gpu_viewer(GpuViewerConfig::default()) {
        eprintln!("Error: {}", e);
    }
}

fn run_benchmark() {
    use std::time::Instant;

    println!("=== Incremental Overlay Benchmark ===\n");

    let sizes = [(64, 48), (128, 96), (256, 192)];
    let iterations = 20;
    let cave_depth = 4;
    let budget = 64;

    for (width, height) in sizes {
        let map = interactive::demo_terrain(width, height);
        let total = width * height;

        println!("Grid size: {}x{} ({} cells)", width, height, total);
        println!("-----------------------");

        // Full coverage through the incremental scheduler, budget per tick
        let start = Instant::now();
        let mut ticks = 0usize;
        for _ in 0..iterations {
            let mut lighting = LightingGrid::new(width, height);
            let mut scheduler =
                IncrementalScheduler::new(budget, cave_depth, Traversal::ColumnTopDown);
            loop {
                let report = scheduler.tick(&map, &mut lighting, &mut ());
                ticks += 1;
                if report.done {
                    break;
                }
            }
        }
        let elapsed_incremental = start.elapsed();
        let avg_scan_ms = elapsed_incremental.as_secs_f64() * 1000.0 / iterations as f64;
        let avg_tick_us = elapsed_incremental.as_secs_f64() * 1e6 / ticks as f64;

        // One-shot serial rebuild: a single tick with an unbounded budget
        let start = Instant::now();
        for _ in 0..iterations {
            let mut lighting = LightingGrid::new(width, height);
            let mut scheduler =
                IncrementalScheduler::new(total, cave_depth, Traversal::ColumnTopDown);
            let _ = scheduler.tick(&map, &mut lighting, &mut ());
        }
        let avg_serial_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        // One-shot parallel rebuild with rayon
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = full_shade_par(&map, cave_depth);
        }
        let avg_parallel_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        println!(
            "  Incremental (budget {}): {:.3} ms/full scan, {:.2} us/tick over {} ticks",
            budget,
            avg_scan_ms,
            avg_tick_us,
            ticks / iterations
        );
        println!("  One-shot serial:         {:.3} ms", avg_serial_ms);
        println!(
            "  One-shot rayon:          {:.3} ms ({:.2}x vs serial)",
            avg_parallel_ms,
            avg_serial_ms / avg_parallel_ms
        );
        println!();
    }
}
