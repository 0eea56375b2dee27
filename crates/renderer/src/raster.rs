//! In-memory RGBA raster implementing [`DrawingSurface`], backed by a
//! `tiny_skia::Pixmap`.
//!
//! The blur set through [`DrawingSurface::set_blur`] is a presentation
//! filter: it is applied when the raster is read out
//! ([`RasterSurface::to_rgba8`], [`RasterSurface::to_png`]), never baked
//! into the stored pixels.

use std::fmt;

use heatmap_common::{HeatmapError, HeatmapResult};
use image::RgbaImage;
use imageproc::filter::separable_filter_equal;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke, Transform};
use tracing::debug;

use crate::color::Rgb;
use crate::png;
use crate::surface::DrawingSurface;

#[derive(Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    blur_px: f64,
}

impl RasterSurface {
    /// Transparent raster of `width` x `height` pixels. Both must be non-zero.
    pub fn new(width: usize, height: usize) -> HeatmapResult<Self> {
        let pixmap = u32::try_from(width)
            .ok()
            .zip(u32::try_from(height).ok())
            .and_then(|(w, h)| Pixmap::new(w, h))
            .ok_or_else(|| {
                HeatmapError::InvalidConfig(format!("invalid raster size {}x{}", width, height))
            })?;

        Ok(Self {
            pixmap,
            blur_px: 0.0,
        })
    }

    pub fn width(&self) -> usize {
        self.pixmap.width() as usize
    }

    pub fn height(&self) -> usize {
        self.pixmap.height() as usize
    }

    /// Blur radius that will be applied on read-out.
    pub fn blur(&self) -> f64 {
        self.blur_px
    }

    /// Unblurred straight-alpha color at `(x, y)`, `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        let px = self.pixmap.pixel(u32::try_from(x).ok()?, u32::try_from(y).ok()?)?;
        let [r, g, b, a] = demultiply(px);
        Some(Rgb::with_alpha(r, g, b, a as f64 / 255.0))
    }

    /// True when nothing has been painted since the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Straight RGBA bytes with the blur filter applied.
    ///
    /// The blur is a separable box filter of width `2r + 1` run over the
    /// premultiplied pixels, so color does not bleed from transparent
    /// areas. Pixels past the raster edge repeat the edge pixel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let radius = self.blur_px.round().max(0.0) as usize;
        if radius == 0 {
            return self.pixmap.pixels().iter().flat_map(|p| demultiply(*p)).collect();
        }

        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let blurred = match RgbaImage::from_raw(width, height, self.pixmap.data().to_vec()) {
            Some(image) => {
                let taps = 2 * radius + 1;
                let kernel = vec![1.0f32 / taps as f32; taps];
                separable_filter_equal(&image, &kernel).into_raw()
            }
            None => self.pixmap.data().to_vec(),
        };

        blurred
            .chunks_exact(4)
            .flat_map(|p| {
                // Rounding in the filter can leave a channel just above alpha
                let a = p[3];
                PremultipliedColorU8::from_rgba(p[0].min(a), p[1].min(a), p[2].min(a), a)
                    .map(demultiply)
                    .unwrap_or([0; 4])
            })
            .collect()
    }

    /// Encode the presented raster as PNG.
    pub fn to_png(&self) -> HeatmapResult<Vec<u8>> {
        let rgba = self.to_rgba8();
        let encoded = png::encode_auto(&rgba, self.width(), self.height())?;
        debug!(
            width = self.width(),
            height = self.height(),
            blur_px = self.blur_px,
            bytes = encoded.len(),
            "Encoded heatmap raster"
        );
        Ok(encoded)
    }

    /// Pixel-aligned rectangle covering `(x, y, width, height)`, with negative
    /// sizes normalized. `None` when nothing of it lands on the raster.
    fn pixel_rect(&self, x: f64, y: f64, width: f64, height: f64) -> Option<Rect> {
        let (x0, x1) = span(x, width, self.pixmap.width());
        let (y0, y1) = span(y, height, self.pixmap.height());
        Rect::from_ltrb(x0, y0, x1, y1)
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("blur_px", &self.blur_px)
            .finish()
    }
}

impl DrawingSurface for RasterSurface {
    /// Reset to transparent. The blur setting is kept.
    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        if let Some(rect) = self.pixel_rect(x, y, width, height) {
            self.pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    /// One pixel wide outline drawn inside the rectangle.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &Rgb) {
        let Some(rect) = self.pixel_rect(x, y, width, height) else {
            return;
        };

        // Center the 1px line on the outermost row and column of pixels
        let inset = Rect::from_ltrb(
            rect.left() + 0.5,
            rect.top() + 0.5,
            (rect.right() - 0.5).max(rect.left() + 0.5),
            (rect.bottom() - 0.5).max(rect.top() + 0.5),
        );
        let path = match inset {
            Some(inset) => PathBuilder::from_rect(inset),
            // A single row or column: fill it instead of stroking a zero-area path
            None => {
                self.pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
                return;
            }
        };

        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    fn set_blur(&mut self, radius_px: f64) {
        self.blur_px = radius_px;
    }
}

/// Solid source-over paint without anti-aliasing, so cells keep hard edges.
fn paint(color: &Rgb) -> Paint<'static> {
    let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = false;
    paint
}

/// Pixel span `[start, end)` covered by `[from, from + len)`, clipped to `limit`.
fn span(from: f64, len: f64, limit: u32) -> (f32, f32) {
    let (lo, hi) = if len < 0.0 {
        (from + len, from)
    } else {
        (from, from + len)
    };
    let clip = |v: f64| v.round().clamp(0.0, limit as f64) as f32;
    (clip(lo), clip(hi))
}

fn demultiply(px: PremultipliedColorU8) -> [u8; 4] {
    let c = px.demultiply();
    [c.red(), c.green(), c.blue(), c.alpha()]
}
