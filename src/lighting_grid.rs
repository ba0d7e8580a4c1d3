//! Per-cell computed overlay state.

/// Computed shade for one cell: the quantized variant bucket for the tile
/// layer and the raw darkness for the pixmap path. Both are carried so a
/// mode toggle never recomputes anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellShade {
    pub variant: u8,
    pub alpha: f32,
}

/// Mirror of the base grid's shape holding the overlay's computed state.
///
/// `None` means untouched: open sky stays fully transparent. Written only by
/// the scheduler during ticks; read by the compositor and the display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<CellShade>>,
}

impl LightingGrid {
    pub fn new(width: usize, height: usize) -> Self {
        LightingGrid {
            width,
            height,
            cells: vec![None; width * height],
        }
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

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<CellShade> {
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, shade: CellShade) {
        let idx = self.idx(x, y);
        self.cells[idx] = Some(shade);
    }

    #[inline]
    pub fn clear_cell(&mut self, x: usize, y: usize) {
        let idx = self.idx(x, y);
        self.cells[idx] = None;
    }

    /// Reset every cell to untouched, as part of a forced full regeneration.
    pub fn clear_all(&mut self) {
        self.cells.fill(None);
    }

    /// Flat row-major view of the cells, for bulk comparisons.
    pub fn cells(&self) -> &[Option<CellShade>] {
        &self.cells
    }
}
