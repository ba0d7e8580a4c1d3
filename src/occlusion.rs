//! Neighbor-occlusion darkness estimate and its quantization onto variant
//! buckets.
//!
//! A cell's darkness is the fraction of its 8 neighbors that occlude it,
//! per https://gamedev.stackexchange.com/a/126165: off-map coordinates count
//! as solid, and every neighbor counts when the target cell sits at or below
//! the cave-depth row, so underground rows read as fully enclosed no matter
//! what actually surrounds them.

use crate::grid::BaseGrid;
use crate::variants::VARIANT_COUNT;

/// Darkness of the cell at (x, y) as a fraction in [0, 1].
///
/// The result is always one of the nine eighths 0/8 ..= 8/8; the quantizer
/// below relies on that step size. Pure and total. The target cell itself
/// never counts, and the cave-depth rule is evaluated per target cell: two
/// cells with identical surroundings can differ if only one is underground.
pub fn occlusion_at(grid: &BaseGrid, x: usize, y: usize, cave_depth: usize) -> f32 {
    let underground = y <= cave_depth;
    let mut occluders = 0u32;
    for dy in -1..=1i32 {
        for dx in -1..=1i32 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if underground || grid.solid_or_out_of_bounds(nx, ny) {
                occluders += 1;
            }
        }
    }
    occluders as f32 / 8.0
}

/// Map a darkness sample onto a variant bucket in [0, 9].
///
/// `floor(1.0 * 10)` is 10, one past the last bucket, so the clamp is part
/// of the contract: full darkness lands in bucket 9.
#[inline]
pub fn variant_index(darkness: f32) -> u8 {
    let bucket = (darkness * VARIANT_COUNT as f32).floor();
    bucket.clamp(0.0, (VARIANT_COUNT - 1) as f32) as u8
}
