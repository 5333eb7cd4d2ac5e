//! Geometry: an immutable vertex/index buffer pair and the built-in presets.
//!
//! Geometry is validated once at construction. Renderers consume it by
//! reference and never mutate it.
//!
//! # Invariants
//! - Every index is `< vertex_count()`.
//! - `index_count()` is a non-zero multiple of 3 (triangle list).

mod preset;

pub use preset::GeometryPreset;

use glam::Vec3;
use serde::Serialize;

/// Errors from geometry validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("geometry has no vertices")]
    NoVertices,
    #[error("geometry has no indices")]
    NoIndices,
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} at position {at} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        at: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("vertex {0} has a non-finite coordinate")]
    NonFinite(usize),
    #[error("unknown geometry preset: {0}")]
    UnknownPreset(String),
}

/// Vertex positions plus a triangle-list index sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryBuffer {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        if positions.is_empty() {
            return Err(GeometryError::NoVertices);
        }
        if let Some(i) = positions
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(GeometryError::NonFinite(i));
        }
        if indices.is_empty() {
            return Err(GeometryError::NoIndices);
        }
        if indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(indices.len()));
        }
        let vertex_count = positions.len();
        if let Some((at, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                at,
                index,
                vertex_count,
            });
        }
        tracing::debug!(
            vertices = vertex_count,
            triangles = indices.len() / 3,
            "geometry validated"
        );
        Ok(Self { positions, indices })
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: u32) -> Vec3 {
        Vec3::from_array(self.positions[index as usize])
    }

    /// Index triples in draw order.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Triangles resolved to their vertex positions.
    pub fn triangle_positions(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles()
            .map(|[a, b, c]| [self.position(a), self.position(b), self.position(c)])
    }

    /// Axis-aligned bounds of the referenced vertices as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.indices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), &i| {
                let p = self.position(i);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Undirected edges shared by two triangles, as sorted index pairs.
    pub fn shared_edges(&self) -> Vec<[u32; 2]> {
        let mut counts: std::collections::BTreeMap<[u32; 2], usize> = Default::default();
        for [a, b, c] in self.triangles() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *counts.entry([u.min(v), u.max(v)]).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(edge, _)| edge)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_vertices() {
        assert_eq!(
            GeometryBuffer::new(vec![], vec![0, 1, 2]),
            Err(GeometryError::NoVertices)
        );
    }

    #[test]
    fn rejects_partial_triangle() {
        let pos = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(
            GeometryBuffer::new(pos, vec![0, 1]),
            Err(GeometryError::PartialTriangle(2))
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let pos = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let err = GeometryBuffer::new(pos, vec![0, 1, 3]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                at: 2,
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn rejects_non_finite_position() {
        let pos = vec![[0.0; 3], [f32::NAN, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(
            GeometryBuffer::new(pos, vec![0, 1, 2]),
            Err(GeometryError::NonFinite(1))
        );
    }

    #[test]
    fn triangle_preset_is_one_triangle() {
        let g = GeometryPreset::Triangle.build();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.indices(), &[0, 1, 2]);
        let tris: Vec<_> = g.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2]]);
        assert!(g.shared_edges().is_empty());
    }

    #[test]
    fn quad_preset_is_two_triangles_sharing_an_edge() {
        let g = GeometryPreset::Quad.build();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.indices(), &[0, 1, 3, 1, 2, 3]);
        assert_eq!(g.triangle_count(), 2);
        assert_eq!(g.shared_edges(), vec![[1, 3]]);
    }

    #[test]
    fn quad_bounds_are_centered() {
        let (min, max) = GeometryPreset::Quad.build().bounds();
        assert_eq!(min, Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(max, Vec3::new(0.5, 0.5, 0.0));
    }
}
