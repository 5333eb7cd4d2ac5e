use crate::{GeometryBuffer, GeometryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in geometry the renderer can be started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryPreset {
    /// Equilateral triangle with its centroid at the origin.
    #[default]
    Triangle,
    /// Axis-aligned square drawn as two triangles.
    Quad,
}

impl GeometryPreset {
    pub const ALL: [GeometryPreset; 2] = [GeometryPreset::Triangle, GeometryPreset::Quad];

    pub fn name(self) -> &'static str {
        match self {
            GeometryPreset::Triangle => "triangle",
            GeometryPreset::Quad => "quad",
        }
    }

    pub fn build(self) -> GeometryBuffer {
        let (positions, indices) = match self {
            GeometryPreset::Triangle => triangle(),
            GeometryPreset::Quad => quad(),
        };
        // Presets are fixed data; validation cannot fail.
        match GeometryBuffer::new(positions, indices) {
            Ok(g) => g,
            Err(e) => unreachable!("built-in {} preset is invalid: {e}", self.name()),
        }
    }
}

fn triangle() -> (Vec<[f32; 3]>, Vec<u32>) {
    let r3 = 3.0_f32.sqrt();
    #[rustfmt::skip]
    let positions = vec![
        [-0.5, -0.5 * r3 / 3.0,       0.0], // lower left
        [ 0.5, -0.5 * r3 / 3.0,       0.0], // lower right
        [ 0.0,  0.5 * r3 * 2.0 / 3.0, 0.0], // top
    ];
    (positions, vec![0, 1, 2])
}

fn quad() -> (Vec<[f32; 3]>, Vec<u32>) {
    #[rustfmt::skip]
    let positions = vec![
        [ 0.5,  0.5, 0.0], // top right
        [ 0.5, -0.5, 0.0], // bottom right
        [-0.5, -0.5, 0.0], // bottom left
        [-0.5,  0.5, 0.0], // top left
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 3,
        1, 2, 3,
    ];
    (positions, indices)
}

impl fmt::Display for GeometryPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryPreset {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GeometryError::UnknownPreset(s.to_string()))
    }
}
