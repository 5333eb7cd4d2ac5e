//! Render Kernel: the mutable per-frame render state and the renderer lifecycle.
//!
//! # Invariants
//! - `RenderState` values are always in range: `size` in `[0.5, 2.0]`, color channels in `[0, 1]`.
//! - All state mutations flow through explicit setters that bump a generation counter.
//! - Drawing is only permitted while the lifecycle is `Ready`.

pub mod lifecycle;
pub mod state;

pub use lifecycle::{Lifecycle, LifecycleError};
pub use state::RenderState;
