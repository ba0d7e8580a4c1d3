//! GPU-accelerated overlay viewer using wgpu + winit

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::compositor::{LightingMode, OverlayCompositor};
use crate::gpu::{GpuContext, OverlayPipeline};
use crate::grid::BaseGrid;
use crate::lighting_grid::LightingGrid;
use crate::scheduler::{IncrementalScheduler, Traversal};
use crate::variants::{Tint, VariantBank, shadow_tints};

const SKY_COLOR: [u8; 3] = [0xb4, 0xd9, 0xd8];
const GROUND_COLOR: [u8; 3] = [0x6b, 0x50, 0x3c];

/// Configuration for the GPU viewer
#[derive(Clone)]
pub struct GpuViewerConfig {
    /// Grid size (width x height in cells)
    pub grid_size: (usize, usize),
    /// Rows at or below this y count as underground
    pub cave_depth: usize,
    /// Cells recomputed per frame
    pub budget: usize,
    /// Scan fill order
    pub traversal: Traversal,
    /// Window title
    pub title: String,
}

impl Default for GpuViewerConfig {
    fn default() -> Self {
        Self {
            grid_size: (96, 64),
            cave_depth: 4,
            budget: 48,
            traversal: Traversal::ColumnTopDown,
            title: "Tileshade - GPU Overlay Viewer (ESC to exit)".to_string(),
        }
    }
}

/// GPU viewer state: the lighting core plus a composited frame image that
/// gets uploaded as one texture per redraw.
struct ViewerState {
    config: GpuViewerConfig,
    gpu_ctx: GpuContext,
    pipeline: OverlayPipeline,

    map: BaseGrid,
    lighting: LightingGrid,
    scheduler: IncrementalScheduler,
    compositor: OverlayCompositor<Tint>,
    frame: Vec<[u8; 4]>, // RGBA8 texels, one per cell, top image row first

    mouse_pos: Option<(f32, f32)>,
    left_mouse_down: bool,
    last_destroy: Option<(usize, usize)>,
}

impl ViewerState {
    fn new(window: Arc<Window>, config: GpuViewerConfig) -> Result<Self, String> {
        let gpu_ctx = GpuContext::new(window)?;
        let pipeline = OverlayPipeline::new(&gpu_ctx);

        let (grid_w, grid_h) = config.grid_size;
        let bank = VariantBank::build(shadow_tints()).map_err(|e| e.to_string())?;

        Ok(Self {
            gpu_ctx,
            pipeline,
            map: super::demo_terrain(grid_w, grid_h),
            lighting: LightingGrid::new(grid_w, grid_h),
            scheduler: IncrementalScheduler::new(config.budget, config.cave_depth, config.traversal),
            compositor: OverlayCompositor::new(grid_w, grid_h, bank),
            frame: vec![[0u8; 4]; grid_w * grid_h],
            mouse_pos: None,
            left_mouse_down: false,
            last_destroy: None,
            config,
        })
    }

    /// Translate window coordinates into grid coordinates (y up).
    fn grid_pos(&self, mx: f32, my: f32) -> (usize, usize) {
        let (grid_w, grid_h) = self.config.grid_size;
        let cell_w = self.gpu_ctx.size.0 as f32 / grid_w as f32;
        let cell_h = self.gpu_ctx.size.1 as f32 / grid_h as f32;
        let gx = ((mx / cell_w) as usize).min(grid_w - 1);
        let gy = grid_h - 1 - ((my / cell_h) as usize).min(grid_h - 1);
        (gx, gy)
    }

    fn destroy_under_cursor(&mut self) {
        if let Some((mx, my)) = self.mouse_pos {
            let (gx, gy) = self.grid_pos(mx, my);
            if self.last_destroy != Some((gx, gy)) {
                if self.map.clear(gx, gy) {
                    self.scheduler.invalidate_neighborhood(gx, gy, &self.map);
                }
                self.last_destroy = Some((gx, gy));
            }
        }
    }

    fn restart(&mut self) {
        self.scheduler.restart();
        self.lighting.clear_all();
        self.compositor.clear_all();
    }

    /// Blend the base map and the overlay into the frame image, top row
    /// first (the compositor's pixmap is exposed pre-flipped the same way).
    fn compose_frame(&mut self) {
        let (grid_w, grid_h) = self.config.grid_size;
        let overlay_on = self.compositor.visible();
        let mode = self.compositor.mode();
        let shadow = self.compositor.pixels_flipped();

        for img_y in 0..grid_h {
            let gy = grid_h - 1 - img_y;
            for x in 0..grid_w {
                let base = if self.map.occupied(x, gy) {
                    GROUND_COLOR
                } else {
                    SKY_COLOR
                };

                let idx = img_y * grid_w + x;
                let alpha = if !overlay_on {
                    0.0
                } else {
                    match mode {
                        LightingMode::TileLayer => self
                            .compositor
                            .tile_at(x, gy)
                            .map_or(0.0, |tint| tint[3] as f32 / 255.0),
                        LightingMode::SmoothTexture => shadow[idx * 4 + 3] as f32 / 255.0,
                    }
                };

                let lit = 1.0 - alpha;
                self.frame[idx] = [
                    (base[0] as f32 * lit) as u8,
                    (base[1] as f32 * lit) as u8,
                    (base[2] as f32 * lit) as u8,
                    255,
                ];
            }
        }
    }

    fn update_and_render(&mut self) {
        if self.left_mouse_down {
            self.destroy_under_cursor();
        }

        self.scheduler
            .tick(&self.map, &mut self.lighting, &mut self.compositor);
        self.compose_frame();

        let (grid_w, grid_h) = self.config.grid_size;
        self.pipeline.update_texture(
            &self.gpu_ctx,
            grid_w as u32,
            grid_h as u32,
            bytemuck::cast_slice(&self.frame),
        );

        if let Err(e) = self.pipeline.render(&self.gpu_ctx, self.compositor.mode()) {
            log::error!("Render error: {:?}", e);
        }
    }
}

/// Application handler for winit event loop
struct GpuViewerApp {
    config: GpuViewerConfig,
    state: Option<ViewerState>,
}

impl GpuViewerApp {
    fn new(config: GpuViewerConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for GpuViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let (grid_w, grid_h) = self.config.grid_size;
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                grid_w as f64 * 12.0,
                grid_h as f64 * 12.0,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        match ViewerState::new(window, self.config.clone()) {
            Ok(state) => {
                println!("=== Tileshade GPU Overlay Viewer ===");
                println!("Controls:");
                println!("  Left Click - Destroy tile");
                println!("  M          - Toggle lighting mode (tile layer / smooth texture)");
                println!("  V          - Toggle overlay visibility");
                println!("  R          - Restart full lighting generation");
                println!("  ESC        - Exit");
                println!();

                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Failed to create viewer state: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                state.gpu_ctx.resize((size.width, size.height));
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => event_loop.exit(),

                KeyCode::KeyM => {
                    state.compositor.toggle_mode();
                    match state.compositor.mode() {
                        LightingMode::TileLayer => println!("Mode: tile layer"),
                        LightingMode::SmoothTexture => println!("Mode: smooth texture"),
                    }
                }
                KeyCode::KeyV => {
                    state.compositor.toggle_visible();
                    println!(
                        "Overlay: {}",
                        if state.compositor.visible() { "on" } else { "off" }
                    );
                }
                KeyCode::KeyR => {
                    state.restart();
                    println!("Restarted lighting generation");
                }

                _ => {}
            },

            WindowEvent::CursorMoved { position, .. } => {
                state.mouse_pos = Some((position.x as f32, position.y as f32));
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => {
                if button == MouseButton::Left {
                    state.left_mouse_down = btn_state == ElementState::Pressed;
                    if !state.left_mouse_down {
                        state.last_destroy = None;
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.update_and_render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            // Request continuous redraw so the incremental scan keeps ticking
            state.gpu_ctx.request_redraw();
        }
    }
}

/// Run the GPU viewer
pub fn run_gpu_viewer(config: GpuViewerConfig) -> Result<(), String> {
    env_logger::init();

    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {}", e))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuViewerApp::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {}", e))?;

    Ok(())
}
