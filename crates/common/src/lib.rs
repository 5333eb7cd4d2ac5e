//! Shared value types used across the trigon workspace.
//!
//! # Invariants
//! - Types here are plain values: `Copy`, no GPU handles, no interior mutability.

pub mod types;

pub use types::{Color, Viewport};
