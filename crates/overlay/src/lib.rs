//! Overlay: immediate-mode controls for the three live render parameters.
//!
//! # Invariants
//! - Widgets edit copies; values reach `RenderState` only through its setters.
//! - The panel never draws geometry itself and never touches GPU state.

mod panel;

pub use panel::{ControlPanel, ControlValues};
