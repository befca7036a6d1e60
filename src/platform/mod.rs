//! Platform layer
//!
//! Everything outside the simulation that a session needs to run without a
//! real engine:
//! - `geometry`: sphere and wall tests
//! - `headless`: [`Backend`](crate::sim::Backend) implementation with timed presentations
//! - `autopilot`: scripted player input for demos and soak runs

pub mod autopilot;
pub mod geometry;
pub mod headless;

pub use autopilot::autopilot;
pub use headless::{HeadlessBackend, PresentationStats};
