//! Rendering layer for the driving simulator: draws a [`SimulatorState`] onto a
//! raster surface, one timestep or a whole animation at a time.
//!
//! [`SimulatorState`]: driving_common::SimulatorState

pub mod animation;
pub mod canvas;
pub mod color;
pub mod display;
pub mod raster;
pub mod viewer;

pub use animation::Animation;
pub use canvas::Axes;
pub use color::{generate_color_palette, parse_color};
pub use display::{Display, MemoryDisplay, PngDisplay, VideoDisplay};
pub use raster::{load_font, Figure};
pub use viewer::{AnimationSummary, FrameOutcome, Viewer};
