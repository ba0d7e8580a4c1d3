//! Interactive demo glue: a procedurally carved terrain plus two viewers.

mod viewer;
pub mod gpu_viewer;

pub use gpu_viewer::{GpuViewerConfig, run_gpu_viewer};
pub use viewer::{OverlayViewer, ViewerConfig};

use crate::grid::BaseGrid;

/// Deterministic demo terrain: solid ground under a wavy surface line with a
/// few carved-out pockets. Stands in for the original's hand-authored map
/// file; the benchmark uses it too so timings run on realistic occupancy.
pub fn demo_terrain(width: usize, height: usize) -> BaseGrid {
    let mut grid = BaseGrid::new(width, height);
    for x in 0..width {
        let t = x as f32 / width.max(1) as f32;
        let wave = (t * std::f32::consts::TAU * 2.0).sin() * height as f32 * 0.08;
        let surface = ((height as f32 * 0.45 + wave) as usize).min(height);
        for y in 0..surface {
            grid.set(x, y, true);
        }
    }
    for (cx, cy, r) in [
        (width / 4, height / 5, width / 14 + 1),
        (width / 2, height / 3, width / 18 + 1),
        (3 * width / 4, height / 6, width / 12 + 1),
    ] {
        carve_pocket(&mut grid, cx, cy, r);
    }
    grid
}

fn carve_pocket(grid: &mut BaseGrid, cx: usize, cy: usize, r: usize) {
    let r2 = (r * r) as i32;
    for y in cy.saturating_sub(r)..(cy + r + 1).min(grid.height()) {
        for x in cx.saturating_sub(r)..(cx + r + 1).min(grid.width()) {
            let dx = x as i32 - cx as i32;
            let dy = y as i32 - cy as i32;
            if dx * dx + dy * dy <= r2 {
                grid.set(x, y, false);
            }
        }
    }
}
