//! wgpu render backend for the trigon Frame Renderer.
//!
//! Draws one fixed geometry with a single shader program whose `size` and
//! `color` uniforms come from `RenderState` every frame.
//!
//! # Invariants
//! - No draw is ever issued against a program that failed to compile or link.
//! - One indexed draw per frame, covering the full index buffer.
//! - Blending is disabled: covered pixels store the uniform color as-is.

mod gpu;
mod program;
mod shaders;

pub use gpu::WgpuFrameRenderer;
pub use program::{CompiledShader, FRAGMENT_ENTRY, ShaderError, ShaderProgram, VERTEX_ENTRY};
pub use shaders::TRIANGLE_SHADER;
