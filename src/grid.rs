//! Base occupancy grid: the solid/empty terrain the overlay is computed from.

/// W x H occupancy map. `y = 0` is the bottom row; a cell is either solid
/// (occupied) or empty. Stored flat in row-major order: `index = y * width + x`.
///
/// The lighting core only reads this, except for [`BaseGrid::clear`], the
/// mutation entry point the input-handling collaborator calls when a tile
/// gets destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl BaseGrid {
    /// Create an all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        BaseGrid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a grid from text rows, top row first. `#` marks a solid cell,
    /// anything else is empty. Handy for tests and demo maps.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut grid = BaseGrid::new(width, height);
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx;
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set(x, y, true);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Whether the in-bounds cell at (x, y) is solid.
    #[inline]
    pub fn occupied(&self, x: usize, y: usize) -> bool {
        self.cells[self.idx(x, y)]
    }

    /// Signed-coordinate read with the boundary rule baked in: off-map
    /// coordinates count as solid, so neighbor scans never bounds-check.
    #[inline]
    pub fn solid_or_out_of_bounds(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// Set or clear a cell.
    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        let idx = self.idx(x, y);
        self.cells[idx] = solid;
    }

    /// Destroy the cell at (x, y). Pair this with the scheduler's
    /// `invalidate_neighborhood` so the overlay catches up. Returns whether
    /// the cell was solid before.
    pub fn clear(&mut self, x: usize, y: usize) -> bool {
        let idx = self.idx(x, y);
        std::mem::replace(&mut self.cells[idx], false)
    }
}
