//! Capabilities the renderer borrows from the host map.
//!
//! The renderer never owns a map or a canvas. It is handed a [`Projection`]
//! (geographic to screen) and a [`DrawingSurface`] (clear / fill / stroke /
//! blur) and paints through them.

use crate::color::Rgb;

/// A point in surface pixel coordinates, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geographic to screen projection supplied by the map.
pub trait Projection {
    /// Project a longitude/latitude pair (degrees) to surface pixels.
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint;
}

impl<P: Projection + ?Sized> Projection for &P {
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        (**self).project(lng, lat)
    }
}

/// A 2D drawing target.
pub trait DrawingSurface {
    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Fill an axis-aligned rectangle. `width`/`height` may be negative.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb);

    /// Outline an axis-aligned rectangle with a 1px line.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb);

    /// Set the blur filter applied when the surface is presented.
    fn set_blur(&mut self, radius_px: f64);
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        (**self).fill_rect(x, y, width, height, color)
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        (**self).stroke_rect(x, y, width, height, color)
    }

    fn set_blur(&mut self, radius_px: f64) {
        (**self).set_blur(radius_px)
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Blur(f64),
}

/// A surface that records drawing calls as a display list.
///
/// Useful for hosts that replay paint calls on their own canvas, and for
/// asserting exactly what a render produced.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since construction, in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Calls made after the most recent clear.
    pub fn since_clear(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear))
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.ops[start..]
    }

    /// Rectangles filled since the most recent clear.
    pub fn fills(&self) -> Vec<&DrawOp> {
        self.since_clear()
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .collect()
    }

    /// Number of clears recorded.
    pub fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear)).count()
    }

    /// The most recent blur radius, if one was set.
    pub fn blur(&self) -> Option<f64> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Blur(r) => Some(*r),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color: *color,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y,
            width,
            height,
            color: *color,
        });
    }

    fn set_blur(&mut self, radius_px: f64) {
        self.ops.push(DrawOp::Blur(radius_px));
    }
}
