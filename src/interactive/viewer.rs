//! Interactive overlay viewer - left click digs tiles, keys drive the modes

use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

use crate::compositor::{LightingMode, OverlayCompositor};
use crate::grid::BaseGrid;
use crate::lighting_grid::LightingGrid;
use crate::scheduler::{IncrementalScheduler, Traversal};
use crate::variants::{Tint, VariantBank, shadow_tints};

const SKY_COLOR: (u32, u32, u32) = (0xb4, 0xd9, 0xd8);
const GROUND_COLOR: (u32, u32, u32) = (0x6b, 0x50, 0x3c);

/// Configuration for the interactive viewer
#[derive(Clone)]
pub struct ViewerConfig {
    /// Grid size (width x height in cells)
    pub grid_size: (usize, usize),
    /// Pixel scale factor (each cell = scale x scale pixels)
    pub scale: usize,
    /// Rows at or below this y count as underground
    pub cave_depth: usize,
    /// Cells recomputed per frame
    pub budget: usize,
    /// Scan fill order
    pub traversal: Traversal,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            grid_size: (96, 64),
            scale: 12,
            cave_depth: 4,
            budget: 48,
            traversal: Traversal::ColumnTopDown,
        }
    }
}

/// Windowed viewer wiring the lighting core to a minifb framebuffer.
pub struct OverlayViewer {
    config: ViewerConfig,
    map: BaseGrid,
    lighting: LightingGrid,
    scheduler: IncrementalScheduler,
    compositor: OverlayCompositor<Tint>,
    window: Window,
    buffer: Vec<u32>,
    last_destroy: Option<(usize, usize)>,
}

impl OverlayViewer {
    /// Create a new viewer with the given configuration
    pub fn new(config: ViewerConfig) -> Result<Self, String> {
        let (grid_w, grid_h) = config.grid_size;
        let window_w = grid_w * config.scale;
        let window_h = grid_h * config.scale;

        let window = Window::new(
            "Tileshade - Overlay Viewer (ESC to exit)",
            window_w,
            window_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        let bank = VariantBank::build(shadow_tints()).map_err(|e| e.to_string())?;

        Ok(Self {
            map: super::demo_terrain(grid_w, grid_h),
            lighting: LightingGrid::new(grid_w, grid_h),
            scheduler: IncrementalScheduler::new(config.budget, config.cave_depth, config.traversal),
            compositor: OverlayCompositor::new(grid_w, grid_h, bank),
            window,
            buffer: vec![0u32; window_w * window_h],
            last_destroy: None,
            config,
        })
    }

    /// Run the viewer loop: one scheduler tick per frame
    pub fn run(&mut self) -> Result<(), String> {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;

        // Limit to ~60fps
        self.window.set_target_fps(60);

        println!("=== Tileshade Overlay Viewer ===");
        println!("Controls:");
        println!("  Left Click - Destroy tile");
        println!("  M          - Toggle lighting mode (tile layer / smooth texture)");
        println!("  V          - Toggle overlay visibility");
        println!("  R          - Restart full lighting generation");
        println!("  ESC        - Exit");
        println!();

        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            if self.window.is_key_pressed(Key::M, minifb::KeyRepeat::No) {
                self.compositor.toggle_mode();
                match self.compositor.mode() {
                    LightingMode::TileLayer => println!("Mode: tile layer"),
                    LightingMode::SmoothTexture => println!("Mode: smooth texture"),
                }
            }
            if self.window.is_key_pressed(Key::V, minifb::KeyRepeat::No) {
                self.compositor.toggle_visible();
                println!(
                    "Overlay: {}",
                    if self.compositor.visible() { "on" } else { "off" }
                );
            }
            if self.window.is_key_pressed(Key::R, minifb::KeyRepeat::No) {
                self.scheduler.restart();
                self.lighting.clear_all();
                self.compositor.clear_all();
                println!("Restarted lighting generation");
            }

            // Left click destroys the tile under the cursor. One destroy per
            // cell per press, so dragging carves instead of re-firing.
            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
                if self.window.get_mouse_down(MouseButton::Left) {
                    let gx = (mx as usize / scale).min(grid_w - 1);
                    let gy = grid_h - 1 - (my as usize / scale).min(grid_h - 1);
                    if self.last_destroy != Some((gx, gy)) {
                        if self.map.clear(gx, gy) {
                            self.scheduler.invalidate_neighborhood(gx, gy, &self.map);
                        }
                        self.last_destroy = Some((gx, gy));
                    }
                } else {
                    self.last_destroy = None;
                }
            }

            self.scheduler
                .tick(&self.map, &mut self.lighting, &mut self.compositor);

            self.draw_frame();

            self.window
                .update_with_buffer(&self.buffer, grid_w * scale, grid_h * scale)
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Draw the base map and composite the overlay per the active mode
    fn draw_frame(&mut self) {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;
        let window_w = grid_w * scale;
        let window_h = grid_h * scale;
        let overlay_on = self.compositor.visible();
        let mode = self.compositor.mode();

        for py in 0..window_h {
            let gy = grid_h - 1 - py / scale;
            for px in 0..window_w {
                let gx = px / scale;

                let (r, g, b) = if self.map.occupied(gx, gy) {
                    GROUND_COLOR
                } else {
                    SKY_COLOR
                };

                let alpha = if !overlay_on {
                    0.0
                } else {
                    match mode {
                        LightingMode::TileLayer => self
                            .compositor
                            .tile_at(gx, gy)
                            .map_or(0.0, |tint| tint[3] as f32 / 255.0),
                        LightingMode::SmoothTexture => {
                            let u = (px as f32 + 0.5) / scale as f32;
                            let v = grid_h as f32 - (py as f32 + 0.5) / scale as f32;
                            self.compositor.sample_alpha_bilinear(u, v)
                        }
                    }
                };

                // Overlay is pure black: darken each channel.
                let lit = 1.0 - alpha;
                let r = (r as f32 * lit) as u32;
                let g = (g as f32 * lit) as u32;
                let b = (b as f32 * lit) as u32;
                self.buffer[py * window_w + px] = (r << 16) | (g << 8) | b;
            }
        }
    }
}
