use serde::{Deserialize, Serialize};
use trigon_common::Color;

/// The mutable per-frame parameters read by the shader program.
///
/// Owned by the render loop and mutated only between frames. Every setter
/// clamps its input into the valid range, and every effective change bumps
/// `generation` so uploaders can skip redundant writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateFields")]
pub struct RenderState {
    visible: bool,
    size: f32,
    color: Color,
    #[serde(skip)]
    generation: u64,
}

impl RenderState {
    pub const MIN_SIZE: f32 = 0.5;
    pub const MAX_SIZE: f32 = 2.0;
    pub const DEFAULT_SIZE: f32 = 1.0;
    pub const DEFAULT_COLOR: Color = Color::new(0.8, 0.3, 0.02, 1.0);

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from raw values, clamping them into range.
    pub fn with_values(visible: bool, size: f32, color: Color) -> Self {
        let mut state = Self::default();
        state.set_visible(visible);
        state.set_size(size);
        state.set_color(color);
        state.generation = 0;
        state
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Incremented on every change. Starts at 0.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the value changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        self.touch();
        true
    }

    /// Clamp `size` into `[MIN_SIZE, MAX_SIZE]`. NaN resets to the default.
    /// Returns `true` if the stored value changed.
    pub fn set_size(&mut self, size: f32) -> bool {
        let size = if size.is_nan() {
            Self::DEFAULT_SIZE
        } else {
            size.clamp(Self::MIN_SIZE, Self::MAX_SIZE)
        };
        if self.size == size {
            return false;
        }
        self.size = size;
        self.touch();
        true
    }

    /// Clamp each channel into `[0, 1]`. Returns `true` if the stored value changed.
    pub fn set_color(&mut self, color: Color) -> bool {
        let color = color.clamped();
        if self.color == color {
            return false;
        }
        self.color = color;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        tracing::trace!(
            generation = self.generation,
            visible = self.visible,
            size = self.size,
            "render state changed"
        );
    }
}

/// Wire shape of [`RenderState`]; deserialized values go through the setters.
#[derive(Deserialize)]
struct StateFields {
    visible: bool,
    size: f32,
    color: Color,
}

impl From<StateFields> for RenderState {
    fn from(fields: StateFields) -> Self {
        Self::with_values(fields.visible, fields.size, fields.color)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            visible: true,
            size: Self::DEFAULT_SIZE,
            color: Self::DEFAULT_COLOR,
            generation: 0,
        }
    }
}
