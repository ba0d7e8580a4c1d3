//! Overlay compositing: a tile-layer mirror of variant handles plus a smooth
//! shadow pixmap, with a mode toggle selecting which one the display layer
//! samples.

use crate::lighting_grid::CellShade;
use crate::variants::VariantBank;

/// Which overlay output the display layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingMode {
    /// Hard-edged lighting from the discrete variant tile layer.
    TileLayer,
    /// Smoothly interpolated shadow gradient sampled from the pixmap
    /// texture.
    SmoothTexture,
}

impl LightingMode {
    pub fn toggle(self) -> Self {
        match self {
            LightingMode::TileLayer => LightingMode::SmoothTexture,
            LightingMode::SmoothTexture => LightingMode::TileLayer,
        }
    }
}

/// Capability interface for surfaces the scheduler writes shades into.
///
/// `begin_pass`/`end_pass` bracket one tick's writes; the scheduler calls
/// each exactly once per tick so partial writes never bleed into another
/// draw.
pub trait ShadeTarget {
    fn begin_pass(&mut self) {}
    fn shade_cell(&mut self, x: usize, y: usize, shade: CellShade);
    fn clear_cell(&mut self, x: usize, y: usize);
    fn end_pass(&mut self) {}
}

/// Null target for headless ticking (tests, benchmarks).
impl ShadeTarget for () {
    fn shade_cell(&mut self, _x: usize, _y: usize, _shade: CellShade) {}
    fn clear_cell(&mut self, _x: usize, _y: usize) {}
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Maintains both overlay representations at once so toggling the mode is a
/// no-op on the data: a tile layer of variant handles, and a W x H RGBA8
/// shadow pixmap where color is black and alpha is the raw darkness.
pub struct OverlayCompositor<H> {
    width: usize,
    height: usize,
    mode: LightingMode,
    visible: bool,
    bank: VariantBank<H>,
    tiles: Vec<Option<H>>,
    pixels: Vec<u8>,
    in_pass: bool,
}

impl<H: Clone> OverlayCompositor<H> {
    pub fn new(width: usize, height: usize, bank: VariantBank<H>) -> Self {
        OverlayCompositor {
            width,
            height,
            mode: LightingMode::SmoothTexture,
            visible: true,
            bank,
            tiles: vec![None; width * height],
            pixels: vec![0u8; width * height * 4],
            in_pass: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mode(&self) -> LightingMode {
        self.mode
    }

    /// Switch between tile and smooth output. Only changes which surface the
    /// display layer samples; the underlying data is untouched.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
    }

    /// Whether the display layer should draw the overlay at all.
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Variant handle assigned to a cell, or `None` for untouched sky.
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&H> {
        self.tiles[self.idx(x, y)].as_ref()
    }

    /// Shadow alpha byte at a cell (0 = transparent, 255 = opaque black).
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[self.idx(x, y) * 4 + 3]
    }

    /// Raw pixmap bytes, row-major with y = 0 (the bottom row) first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixmap bytes with rows reversed for texture upload: image origin is
    /// top-left while the grid origin is bottom-left, so the flip is
    /// mandatory for correct placement over the base map.
    pub fn pixels_flipped(&self) -> Vec<u8> {
        let row = self.width * 4;
        let mut out = Vec::with_capacity(self.pixels.len());
        for y in (0..self.height).rev() {
            out.extend_from_slice(&self.pixels[y * row..(y + 1) * row]);
        }
        out
    }

    /// Bilinearly interpolated shadow alpha at a grid-space point (cell
    /// units, y up). Texel centers sit at cell centers and coordinates clamp
    /// to the edge, matching a clamp-to-edge linear sampler.
    pub fn sample_alpha_bilinear(&self, u: f32, v: f32) -> f32 {
        let fx = (u - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy = (v - 0.5).clamp(0.0, (self.height - 1) as f32);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let alpha = |x: usize, y: usize| self.pixels[(y * self.width + x) * 4 + 3] as f32 / 255.0;
        let bottom = alpha(x0, y0) * (1.0 - tx) + alpha(x1, y0) * tx;
        let top = alpha(x0, y1) * (1.0 - tx) + alpha(x1, y1) * tx;
        bottom * (1.0 - ty) + top * ty
    }

    /// Reset both surfaces to fully transparent, as part of a forced full
    /// regeneration.
    pub fn clear_all(&mut self) {
        self.tiles.fill(None);
        self.pixels.fill(0);
    }
}

impl<H: Clone> ShadeTarget for OverlayCompositor<H> {
    fn begin_pass(&mut self) {
        debug_assert!(!self.in_pass, "overlay pass already open");
        self.in_pass = true;
    }

    fn shade_cell(&mut self, x: usize, y: usize, shade: CellShade) {
        debug_assert!(self.in_pass, "overlay write outside a pass");
        let idx = self.idx(x, y);
        self.tiles[idx] = Some(self.bank.lookup(shade.variant).clone());
        let px = idx * 4;
        self.pixels[px..px + 3].fill(0);
        self.pixels[px + 3] = to_byte(shade.alpha);
    }

    fn clear_cell(&mut self, x: usize, y: usize) {
        debug_assert!(self.in_pass, "overlay write outside a pass");
        let idx = self.idx(x, y);
        self.tiles[idx] = None;
        self.pixels[idx * 4..idx * 4 + 4].fill(0);
    }

    fn end_pass(&mut self) {
        debug_assert!(self.in_pass, "overlay pass closed twice");
        self.in_pass = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::{VariantBank, shadow_tints};

    fn small_compositor() -> OverlayCompositor<crate::variants::Tint> {
        OverlayCompositor::new(2, 2, VariantBank::build(shadow_tints()).unwrap())
    }

    #[test]
    fn test_shade_writes_both_surfaces() {
        let mut comp = small_compositor();
        comp.begin_pass();
        comp.shade_cell(1, 0, CellShade { variant: 9, alpha: 1.0 });
        comp.end_pass();

        assert_eq!(comp.tile_at(1, 0), Some(&[0, 0, 0, 255]));
        assert_eq!(comp.alpha_at(1, 0), 255);
        assert_eq!(comp.tile_at(0, 0), None);
        assert_eq!(comp.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_pixels_flipped_puts_top_row_first() {
        let mut comp = small_compositor();
        comp.begin_pass();
        // Shade the grid's top-left cell (y = 1).
        comp.shade_cell(0, 1, CellShade { variant: 9, alpha: 1.0 });
        comp.end_pass();

        let flipped = comp.pixels_flipped();
        // Image row 0, column 0 is the grid's top-left cell.
        assert_eq!(flipped[3], 255);
        // Image row 1 (grid bottom row) stays transparent.
        assert_eq!(flipped[2 * 4 + 3], 0);
    }

    #[test]
    fn test_bilinear_sample_midpoint() {
        let mut comp = small_compositor();
        comp.begin_pass();
        comp.shade_cell(0, 0, CellShade { variant: 9, alpha: 1.0 });
        comp.end_pass();

        // Center of the 2x2 grid sits evenly between all four texel centers.
        let mid = comp.sample_alpha_bilinear(1.0, 1.0);
        assert!((mid - 0.25).abs() < 1e-6);
        // At the shaded cell's center the sample is exact.
        assert!((comp.sample_alpha_bilinear(0.5, 0.5) - 1.0).abs() < 1e-6);
    }
}
