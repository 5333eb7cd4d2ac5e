//! Input: platform events translated into the few actions the render loop reacts to.
//!
//! # Invariants
//! - The render loop consumes `Action`s, never raw window events.
//! - A zero-area resize never produces a viewport change.

pub mod action;

pub use action::{Action, InputEvent, Key, map_event};
