//! Common types and utilities shared across the heatmap overlay crates.

pub mod bbox;
pub mod error;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{HeatmapError, HeatmapResult};
pub use grid::{compute_stats, Grid, GridStats, MAX_GRID_CELLS};
