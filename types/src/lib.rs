//! Core domain types for MKS OS.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the shell: the config store, the
//! engine state machine, and the TUI renderer.

mod clock;
mod geometry;
mod ids;
mod input;
mod region;
mod sanitize;
mod settings;

pub use clock::ClockTick;
pub use geometry::{Geometry, GeometryError, MIN_HEIGHT, MIN_WIDTH};
pub use ids::WindowId;
pub use input::{Key, KeyInput};
pub use region::{Point, Region};
pub use sanitize::sanitize_label;
pub use settings::{
    DEFAULT_GEOMETRY, DEFAULT_TITLE, ShellConfig, Theme, ThemeParseError,
};
