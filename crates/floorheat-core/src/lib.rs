//! Core data model for floorplan heat simulation.
//!
//! This crate provides the fundamental types shared by every execution
//! backend: the padded temperature [`Grid`] with its double-buffered
//! storage, the room/wall [`InteriorMask`], and summary statistics over
//! the final temperature field.

pub mod error;
pub mod grid;
pub mod mask;
pub mod stats;

pub use error::{Error, Result};
pub use grid::{Grid, GridDims};
pub use mask::InteriorMask;
pub use stats::{summarize, FieldStatistics, StatsAccumulator, COLD_THRESHOLD, WARM_THRESHOLD};
