//! Heatmap overlay rendering.
//!
//! Turns a [`heatmap_common::Grid`] of counts into shaded rectangles:
//! - [`color`]: RGB/HSL color model and two-color ramps
//! - [`interpolation`]: linear, exponential and logarithmic intensity curves
//! - [`cells`]: the per-cell renderer
//! - [`surface`]: projection and drawing traits supplied by the host map
//! - [`raster`] / [`png`]: an offscreen surface and its PNG encoder
//! - [`viewport`]: a fixed projection for headless rendering

pub mod cells;
pub mod color;
pub mod interpolation;
pub mod png;
pub mod raster;
pub mod surface;
pub mod viewport;

pub use cells::{render_outline, CellRenderer, RenderOptions, RenderSummary};
pub use color::{to_hex, ColorRamp, Hsl, Rgb};
pub use interpolation::{make_curve, Curve, InterpolationMethod};
pub use raster::RasterSurface;
pub use surface::{DrawOp, DrawingSurface, Projection, RecordingSurface, ScreenPoint};
pub use viewport::{ProjectionKind, Viewport};
