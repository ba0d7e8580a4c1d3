//! Scenario tests for the lighting overlay pipeline

use std::collections::HashMap;

use crate::interactive::demo_terrain;
use crate::{
    BaseGrid, CellShade, IncrementalScheduler, LightingGrid, LightingMode, OverlayCompositor,
    ShadeTarget, Tint, Traversal, VariantBank, full_shade_par, occlusion_at, shadow_tints,
    variant_index,
};

/// Target that records every write per cell plus pass bracketing.
#[derive(Default)]
struct CountingTarget {
    events: HashMap<(usize, usize), usize>,
    passes: usize,
    open: bool,
}

impl ShadeTarget for CountingTarget {
    fn begin_pass(&mut self) {
        assert!(!self.open, "pass opened twice");
        self.open = true;
        self.passes += 1;
    }

    fn shade_cell(&mut self, x: usize, y: usize, _shade: CellShade) {
        assert!(self.open, "write outside a pass");
        *self.events.entry((x, y)).or_default() += 1;
    }

    fn clear_cell(&mut self, x: usize, y: usize) {
        assert!(self.open, "write outside a pass");
        *self.events.entry((x, y)).or_default() += 1;
    }

    fn end_pass(&mut self) {
        assert!(self.open, "pass closed twice");
        self.open = false;
    }
}

fn run_to_completion(
    scheduler: &mut IncrementalScheduler,
    map: &BaseGrid,
    lighting: &mut LightingGrid,
) -> usize {
    let mut ticks = 0;
    loop {
        let report = scheduler.tick(map, lighting, &mut ());
        ticks += 1;
        if report.done {
            return ticks;
        }
        assert!(ticks < 100_000, "scan never finished");
    }
}

#[test]
fn test_main() {
    crate::main();
}

#[test]
fn test_empty_grid_interior_is_fully_lit() {
    let grid = BaseGrid::new(6, 6);
    for x in 1..5 {
        for y in 1..5 {
            let darkness = occlusion_at(&grid, x, y, 0);
            assert_eq!(darkness, 0.0, "cell ({x}, {y})");
            assert_eq!(variant_index(darkness), 0);
        }
    }
}

#[test]
fn test_enclosed_cell_hits_clamped_last_bucket() {
    let grid = BaseGrid::from_rows(&[
        ".....", //
        ".###.", //
        ".#.#.", //
        ".###.", //
        ".....",
    ]);
    let darkness = occlusion_at(&grid, 2, 2, 0);
    assert_eq!(darkness, 1.0);
    // floor(1.0 * 10) = 10: the clamp to bucket 9 is what this exercises.
    assert_eq!(variant_index(darkness), 9);
}

#[test]
fn test_quantization_is_monotonic() {
    let eighths: Vec<f32> = (0..=8).map(|i| i as f32 / 8.0).collect();
    for pair in eighths.windows(2) {
        assert!(variant_index(pair[0]) <= variant_index(pair[1]));
    }
    // The nine inputs land in distinct buckets apart from the clamp.
    let buckets: Vec<u8> = eighths.iter().map(|&d| variant_index(d)).collect();
    assert_eq!(buckets, vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
}

#[test]
fn test_single_occupied_cell_contributes_one_eighth() {
    let mut grid = BaseGrid::new(10, 10);
    grid.set(5, 5, true);

    for dy in -1..=1i32 {
        for dx in -1..=1i32 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let x = (5 + dx) as usize;
            let y = (5 + dy) as usize;
            // Interior neighbors have no other occluders, so darkness is
            // exactly the one solid cell's contribution.
            let darkness = occlusion_at(&grid, x, y, 0);
            assert_eq!(darkness, 1.0 / 8.0, "neighbor ({x}, {y})");
            assert_eq!(variant_index(darkness), 1);
        }
    }

    // The solid cell itself sees only empty interior neighbors.
    assert_eq!(occlusion_at(&grid, 5, 5, 0), 0.0);
}

#[test]
fn test_traversal_orders() {
    let (w, h) = (4, 3);
    // Column-major, each column top-down: the reference fill order.
    assert_eq!(Traversal::ColumnTopDown.cell(0, w, h), (0, 2));
    assert_eq!(Traversal::ColumnTopDown.cell(1, w, h), (0, 1));
    assert_eq!(Traversal::ColumnTopDown.cell(2, w, h), (0, 0));
    assert_eq!(Traversal::ColumnTopDown.cell(3, w, h), (1, 2));
    assert_eq!(Traversal::ColumnTopDown.cell(11, w, h), (3, 0));
    // Row-major from the bottom row.
    assert_eq!(Traversal::RowMajor.cell(0, w, h), (0, 0));
    assert_eq!(Traversal::RowMajor.cell(3, w, h), (3, 0));
    assert_eq!(Traversal::RowMajor.cell(4, w, h), (0, 1));
}

#[test]
fn test_scheduler_covers_every_cell_exactly_once() {
    let map = demo_terrain(10, 10);
    let mut lighting = LightingGrid::new(10, 10);
    let mut scheduler = IncrementalScheduler::new(7, 2, Traversal::ColumnTopDown);
    let mut target = CountingTarget::default();

    // ceil(100 / 7) = 15 ticks to cover the grid.
    let mut ticks = 0;
    loop {
        let report = scheduler.tick(&map, &mut lighting, &mut target);
        ticks += 1;
        if report.done {
            break;
        }
    }

    assert_eq!(ticks, 15);
    assert_eq!(scheduler.budget(), 7);
    assert_eq!(scheduler.cursor(), 100);
    assert_eq!(target.passes, ticks);
    assert_eq!(target.events.len(), 100);
    assert!(target.events.values().all(|&count| count == 1));

    // A further tick has nothing to do but still brackets its pass.
    let report = scheduler.tick(&map, &mut lighting, &mut target);
    assert_eq!(report.visited, 0);
    assert!(report.done);
    assert_eq!(target.passes, ticks + 1);
}

#[test]
fn test_restart_reproduces_uninterrupted_run() {
    let map = demo_terrain(24, 16);
    let cave_depth = 4;

    let mut reference = LightingGrid::new(24, 16);
    let mut scheduler = IncrementalScheduler::new(9, cave_depth, Traversal::ColumnTopDown);
    run_to_completion(&mut scheduler, &map, &mut reference);

    // Restart mid-flight, then run to completion: same result.
    let mut lighting = LightingGrid::new(24, 16);
    let mut scheduler = IncrementalScheduler::new(9, cave_depth, Traversal::ColumnTopDown);
    for _ in 0..5 {
        scheduler.tick(&map, &mut lighting, &mut ());
    }
    scheduler.restart();
    run_to_completion(&mut scheduler, &map, &mut lighting);
    assert_eq!(lighting, reference);

    // Restart after completion reproduces the grid again.
    scheduler.restart();
    run_to_completion(&mut scheduler, &map, &mut lighting);
    assert_eq!(lighting, reference);

    // And the parallel one-shot rebuild agrees cell for cell.
    assert_eq!(full_shade_par(&map, cave_depth), reference);
}

#[test]
fn test_open_sky_is_skipped_and_underground_is_dark() {
    // 10x10, all empty, cave depth 4, budget 10: one column per tick.
    let map = BaseGrid::new(10, 10);
    let mut lighting = LightingGrid::new(10, 10);
    let mut scheduler = IncrementalScheduler::new(10, 4, Traversal::ColumnTopDown);

    for _ in 0..10 {
        let report = scheduler.tick(&map, &mut lighting, &mut ());
        assert_eq!(report.visited, 10);
        // Each column computes exactly its five underground cells.
        assert_eq!(report.computed, 5);
    }

    assert_eq!(scheduler.cursor(), 100);
    assert_eq!(scheduler.cave_depth(), 4);
    // Exactly the five underground rows got shaded.
    assert_eq!(lighting.cells().iter().flatten().count(), 50);
    for x in 0..10 {
        for y in 5..10 {
            assert_eq!(lighting.get(x, y), None, "sky cell ({x}, {y})");
        }
        for y in 0..=4 {
            let shade = lighting.get(x, y).expect("underground cell shaded");
            assert_eq!(shade.alpha, 1.0);
            assert_eq!(shade.variant, 9);
        }
    }
}

#[test]
fn test_destroy_repairs_only_the_neighborhood() {
    let rows = vec!["##########"; 10];
    let mut map = BaseGrid::from_rows(&rows);
    let mut lighting = LightingGrid::new(10, 10);
    let mut scheduler = IncrementalScheduler::new(100, 0, Traversal::ColumnTopDown);
    scheduler.tick(&map, &mut lighting, &mut ());

    assert_eq!(lighting.get(5, 5).unwrap().alpha, 1.0);

    map.clear(5, 5);
    scheduler.invalidate_neighborhood(5, 5, &map);
    let report = scheduler.tick(&map, &mut lighting, &mut ());

    // 3x3 neighborhood revisited: the destroyed cell is now open sky and
    // gets cleared, its 8 neighbors lose exactly one occluder.
    assert_eq!(report.visited, 9);
    assert_eq!(report.computed, 8);
    assert!(report.done);
    assert_eq!(lighting.get(5, 5), None);
    for dy in -1..=1i32 {
        for dx in -1..=1i32 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let shade = lighting.get((5 + dx) as usize, (5 + dy) as usize).unwrap();
            assert_eq!(shade.alpha, 7.0 / 8.0);
            assert_eq!(shade.variant, 8);
        }
    }
    // Cells outside the neighborhood are untouched.
    assert_eq!(lighting.get(3, 3).unwrap().alpha, 1.0);
    assert_eq!(lighting.get(7, 7).unwrap().alpha, 1.0);
}

#[test]
fn test_invalidation_clamps_at_grid_edges() {
    let rows = vec!["#####"; 5];
    let mut map = BaseGrid::from_rows(&rows);
    let mut lighting = LightingGrid::new(5, 5);
    let mut scheduler = IncrementalScheduler::new(25, 0, Traversal::ColumnTopDown);
    scheduler.tick(&map, &mut lighting, &mut ());

    map.clear(0, 4);
    scheduler.invalidate_neighborhood(0, 4, &map);
    let report = scheduler.tick(&map, &mut lighting, &mut ());

    // Corner neighborhood is only 4 cells.
    assert_eq!(report.visited, 4);
    assert_eq!(lighting.get(0, 4), None);
    // The diagonal neighbor lost exactly one occluder.
    assert_eq!(lighting.get(1, 3).unwrap().alpha, 7.0 / 8.0);
}

fn shaded_compositor() -> (BaseGrid, LightingGrid, OverlayCompositor<Tint>) {
    let map = demo_terrain(12, 10);
    let mut lighting = LightingGrid::new(12, 10);
    let bank = VariantBank::build(shadow_tints()).unwrap();
    let mut compositor = OverlayCompositor::new(12, 10, bank);
    let mut scheduler = IncrementalScheduler::new(120, 3, Traversal::ColumnTopDown);
    scheduler.tick(&map, &mut lighting, &mut compositor);
    (map, lighting, compositor)
}

#[test]
fn test_mode_toggle_is_a_noop_on_data() {
    let (_map, lighting, mut compositor) = shaded_compositor();

    let lighting_before = lighting.clone();
    let pixels_before = compositor.pixels().to_vec();
    let tiles_before: Vec<Option<Tint>> = (0..10)
        .flat_map(|y| (0..12).map(move |x| (x, y)))
        .map(|(x, y)| compositor.tile_at(x, y).copied())
        .collect();

    assert_eq!(compositor.mode(), LightingMode::SmoothTexture);
    compositor.toggle_mode();
    assert_eq!(compositor.mode(), LightingMode::TileLayer);

    let tiles_after: Vec<Option<Tint>> = (0..10)
        .flat_map(|y| (0..12).map(move |x| (x, y)))
        .map(|(x, y)| compositor.tile_at(x, y).copied())
        .collect();

    assert_eq!(lighting, lighting_before);
    assert_eq!(compositor.pixels(), pixels_before.as_slice());
    assert_eq!(tiles_after, tiles_before);
}

#[test]
fn test_compositor_tracks_lighting_grid() {
    let (_map, lighting, compositor) = shaded_compositor();
    let bank = VariantBank::build(shadow_tints()).unwrap();
    assert_eq!(
        (compositor.width(), compositor.height()),
        (lighting.width(), lighting.height())
    );

    for y in 0..lighting.height() {
        for x in 0..lighting.width() {
            match lighting.get(x, y) {
                Some(shade) => {
                    assert_eq!(compositor.tile_at(x, y), Some(bank.lookup(shade.variant)));
                    assert_eq!(
                        compositor.alpha_at(x, y),
                        (shade.alpha.clamp(0.0, 1.0) * 255.0) as u8
                    );
                }
                None => {
                    assert_eq!(compositor.tile_at(x, y), None);
                    assert_eq!(compositor.alpha_at(x, y), 0);
                }
            }
        }
    }
}
