//! GPU display path using wgpu.
//!
//! The composited overlay image is uploaded as a single texture each frame
//! and stretched across the window; the sampler (nearest or linear) follows
//! the active lighting mode.

pub mod context;
pub mod overlay;

pub use context::GpuContext;
pub use overlay::OverlayPipeline;
