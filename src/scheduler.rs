//! Amortized regeneration of the lighting grid: a bounded number of cells per
//! tick, spread over as many frames as it takes to cover the whole grid.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::compositor::ShadeTarget;
use crate::grid::BaseGrid;
use crate::lighting_grid::{CellShade, LightingGrid};
use crate::occlusion::{occlusion_at, variant_index};

/// Flat-cursor to (x, y) traversal strategies.
///
/// The order is what the user sees while a scan is in flight, so it is an
/// explicit parameter instead of arithmetic buried in the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Column by column, each column filled from the top row down:
    /// `x = cursor / H`, `y = H - 1 - (cursor % H)`. The default; columns
    /// visibly populate left to right.
    ColumnTopDown,
    /// Row by row starting from the bottom row.
    RowMajor,
}

impl Traversal {
    /// Convert a flat cursor in [0, W*H) into grid coordinates.
    #[inline]
    pub fn cell(self, cursor: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Traversal::ColumnTopDown => (cursor / height, height - 1 - cursor % height),
            Traversal::RowMajor => (cursor % width, cursor / width),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Cells looked at this tick, skips included.
    pub visited: usize,
    /// Cells that got a shade computed and written.
    pub computed: usize,
    /// Whether the scan has covered the whole grid and no repairs are queued.
    pub done: bool,
}

/// Spreads full-grid recomputation over ticks so no single frame pays for
/// O(W*H) darkness estimates. Owns the scan cursor; runs once per display
/// frame and touches at most `budget` cells each time.
#[derive(Debug, Clone)]
pub struct IncrementalScheduler {
    budget: usize,
    cave_depth: usize,
    traversal: Traversal,
    cursor: usize,
    pending: VecDeque<(usize, usize)>,
}

impl IncrementalScheduler {
    pub fn new(budget: usize, cave_depth: usize, traversal: Traversal) -> Self {
        IncrementalScheduler {
            budget,
            cave_depth,
            traversal,
            cursor: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn cave_depth(&self) -> usize {
        self.cave_depth
    }

    /// Scan progress in cells; equals W*H once a full pass has finished.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Discard in-flight progress and start a fresh full scan.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.pending.clear();
    }

    /// Queue the 3x3 neighborhood around a mutated base cell for
    /// recomputation ahead of cursor work. This is the partial-regeneration
    /// path for tile destruction: a single occupancy change can only alter
    /// the darkness of the cells adjacent to it.
    pub fn invalidate_neighborhood(&mut self, x: usize, y: usize, map: &BaseGrid) {
        for dy in -1..=1i32 {
            for dx in -1..=1i32 {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0
                    && ny >= 0
                    && (nx as usize) < map.width()
                    && (ny as usize) < map.height()
                {
                    self.pending.push_back((nx as usize, ny as usize));
                }
            }
        }
    }

    /// Run one tick: queued repairs first, then cursor work, at most
    /// `budget` cells in total. Opens and closes the target's write pass
    /// exactly once.
    pub fn tick(
        &mut self,
        map: &BaseGrid,
        lighting: &mut LightingGrid,
        target: &mut impl ShadeTarget,
    ) -> TickReport {
        let total = map.width() * map.height();
        let mut visited = 0usize;
        let mut computed = 0usize;

        target.begin_pass();

        while visited < self.budget {
            let Some((x, y)) = self.pending.pop_front() else {
                break;
            };
            visited += 1;
            if self.shade_cell(map, x, y, lighting, target) {
                computed += 1;
            }
        }

        while visited < self.budget && self.cursor < total {
            let (x, y) = self.traversal.cell(self.cursor, map.width(), map.height());
            self.cursor += 1;
            visited += 1;
            if self.shade_cell(map, x, y, lighting, target) {
                computed += 1;
            }
        }

        target.end_pass();

        TickReport {
            visited,
            computed,
            done: self.cursor >= total && self.pending.is_empty(),
        }
    }

    /// Shade a single cell, or clear it if it is open sky (empty and above
    /// the cave-depth row). The sky check is the whole cost of a skip.
    fn shade_cell(
        &self,
        map: &BaseGrid,
        x: usize,
        y: usize,
        lighting: &mut LightingGrid,
        target: &mut impl ShadeTarget,
    ) -> bool {
        if y > self.cave_depth && !map.occupied(x, y) {
            lighting.clear_cell(x, y);
            target.clear_cell(x, y);
            return false;
        }
        let darkness = occlusion_at(map, x, y, self.cave_depth);
        let shade = CellShade {
            variant: variant_index(darkness),
            alpha: darkness,
        };
        lighting.set(x, y, shade);
        target.shade_cell(x, y, shade);
        true
    }
}

/// One-shot whole-grid shade with columns computed in parallel. Batch
/// counterpart to the incremental scheduler; serves as the benchmark
/// baseline and as ground truth in tests.
pub fn full_shade_par(map: &BaseGrid, cave_depth: usize) -> LightingGrid {
    let (width, height) = (map.width(), map.height());
    let columns: Vec<Vec<Option<CellShade>>> = (0..width)
        .into_par_iter()
        .map(|x| {
            (0..height)
                .map(|y| {
                    if y > cave_depth && !map.occupied(x, y) {
                        return None;
                    }
                    let darkness = occlusion_at(map, x, y, cave_depth);
                    Some(CellShade {
                        variant: variant_index(darkness),
                        alpha: darkness,
                    })
                })
                .collect()
        })
        .collect();

    let mut out = LightingGrid::new(width, height);
    for (x, column) in columns.into_iter().enumerate() {
        for (y, shade) in column.into_iter().enumerate() {
            if let Some(shade) = shade {
                out.set(x, y, shade);
            }
        }
    }
    out
}
