//! Rendering Adapter: the frame contract shared by every renderer.
//!
//! # Invariants
//! - Every frame starts with a clear to the configured background.
//! - At most one indexed draw per frame, covering the full index sequence.
//! - A hidden state clears but never draws.
//! - Renderers read `RenderState`; they never mutate it.
//!
//! The `SoftwareRenderer` rasterizes on the CPU with the same rules the GPU
//! pipeline uses (no culling, no blending), so frame properties can be
//! checked without a device.

mod renderer;
mod software;

pub use renderer::{DrawOutcome, FrameConfig, FrameRenderer};
pub use software::{FrameReport, Framebuffer, PixelBounds, SoftwareRenderer};

pub fn crate_info() -> &'static str {
    "trigon-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
