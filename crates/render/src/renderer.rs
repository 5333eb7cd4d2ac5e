use trigon_common::{Color, Viewport};
use trigon_geometry::{GeometryBuffer, GeometryPreset};
use trigon_kernel::RenderState;

/// Startup configuration moved into a renderer when it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameConfig {
    /// Background every frame is cleared to.
    pub clear_color: Color,
    /// Geometry drawn when the state is visible.
    pub geometry: GeometryBuffer,
}

impl FrameConfig {
    pub const DEFAULT_CLEAR: Color = Color::new(0.2, 0.3, 0.3, 1.0);

    pub fn with_preset(preset: GeometryPreset) -> Self {
        Self {
            clear_color: Self::DEFAULT_CLEAR,
            geometry: preset.build(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::with_preset(GeometryPreset::default())
    }
}

/// What a renderer did for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Cleared, then one indexed draw of `index_count` indices.
    Drawn { index_count: u32 },
    /// Cleared only; the state was hidden.
    Hidden,
    /// Zero-area target; nothing was touched.
    NoTarget,
}

impl DrawOutcome {
    pub fn drew(&self) -> bool {
        matches!(self, DrawOutcome::Drawn { .. })
    }
}

/// Renderer-agnostic frame contract.
///
/// Implementations clear to the configured background, then, if the state is
/// visible, push `size` and `color` and draw the whole geometry once.
pub trait FrameRenderer {
    /// The output type produced by this renderer.
    type Output;

    /// Resize the output target. The viewport becomes `(0, 0, width, height)`
    /// and applies from the next frame on.
    fn resize(&mut self, width: u32, height: u32);

    /// Viewport the next frame will be drawn with.
    fn viewport(&self) -> Viewport;

    /// Render one frame from the given state.
    fn render_frame(&mut self, state: &RenderState) -> Self::Output;
}
