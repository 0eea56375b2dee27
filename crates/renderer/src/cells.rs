//! Cell rendering: one shaded rectangle per populated grid cell.

use heatmap_common::{Grid, GridStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{ColorRamp, Rgb};
use crate::interpolation::{Curve, InterpolationMethod};
use crate::surface::{DrawingSurface, Projection};

/// Default blur radius in pixels.
pub const DEFAULT_BLUR_PX: f64 = 10.0;

/// Default layer opacity.
pub const DEFAULT_OPACITY: f64 = 0.5;

/// Color used for the grid outline.
pub const OUTLINE_COLOR: Rgb = Rgb {
    r: 0,
    g: 255,
    b: 0,
    a: 1.0,
};

/// Everything that decides how a cell is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub ramp: ColorRamp,
    pub method: InterpolationMethod,
    /// Multiplied into the ramp color's alpha
    pub opacity: f64,
    /// Blur filter radius applied to the surface after painting
    pub blur_px: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ramp: ColorRamp::default(),
            method: InterpolationMethod::Linear,
            opacity: DEFAULT_OPACITY,
            blur_px: DEFAULT_BLUR_PX,
        }
    }
}

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSummary {
    /// Rectangles filled
    pub painted: usize,
    /// Present cells left unpainted (zero or undefined intensity)
    pub skipped: usize,
    /// Rows with no data
    pub absent_rows: usize,
}

/// Paints density grids onto a surface.
#[derive(Debug, Clone)]
pub struct CellRenderer {
    options: RenderOptions,
}

impl CellRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Normalized intensity of `value`, or `None` if the cell is not painted.
    ///
    /// Values are normalized against `stats.max` only. A zero max, a
    /// non-finite ratio, or a curve result `<= 0` all mean "no density".
    pub fn intensity(&self, curve: &Curve, value: f64, stats: &GridStats) -> Option<f64> {
        if stats.max == 0.0 {
            return None;
        }
        let ratio = value / stats.max;
        if !ratio.is_finite() {
            return None;
        }

        let t = curve.eval(ratio);
        (t > 0.0).then_some(t)
    }

    /// Final fill color for intensity `t`.
    pub fn cell_color(&self, t: f64) -> Rgb {
        self.options.ramp.at(t).opacify(self.options.opacity)
    }

    /// Paint every populated cell of `grid`.
    ///
    /// Rows are walked north to south from `max_y`, columns west to east from
    /// `min_x`. Absent rows paint nothing but still advance the row cursor so
    /// later rows stay aligned. Grids without any value paint nothing and
    /// leave the blur untouched.
    pub fn render<P, S>(
        &self,
        grid: &Grid,
        stats: &GridStats,
        projection: &P,
        surface: &mut S,
    ) -> RenderSummary
    where
        P: Projection + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        let mut summary = RenderSummary::default();

        if !grid.has_data() {
            debug!(rows = grid.rows, columns = grid.columns, "No cell data, nothing to paint");
            return summary;
        }

        let curve = Curve::new(0.0, 1.0, self.options.method);
        let (dx, dy) = grid.cell_size();

        let mut y = grid.bounds.max_y;
        for row in &grid.cells {
            match row {
                Some(values) => {
                    let mut x = grid.bounds.min_x;
                    for &value in values {
                        match self.intensity(&curve, value, stats) {
                            Some(t) => {
                                let p1 = projection.project(x, y);
                                let p2 = projection.project(x + dx, y - dy);
                                let color = self.cell_color(t);
                                surface.fill_rect(p1.x, p1.y, p2.x - p1.x, p2.y - p1.y, &color);
                                summary.painted += 1;
                            }
                            None => summary.skipped += 1,
                        }
                        x += dx;
                    }
                }
                None => summary.absent_rows += 1,
            }
            y -= dy;
        }

        surface.set_blur(self.options.blur_px);

        debug!(
            painted = summary.painted,
            skipped = summary.skipped,
            absent_rows = summary.absent_rows,
            method = %self.options.method,
            "Rendered heatmap cells"
        );

        summary
    }
}

/// Outline the grid's bounding rectangle. Used when debugging alignment.
pub fn render_outline<P, S>(grid: &Grid, projection: &P, surface: &mut S)
where
    P: Projection + ?Sized,
    S: DrawingSurface + ?Sized,
{
    let ul = projection.project(grid.bounds.min_x, grid.bounds.max_y);
    let lr = projection.project(grid.bounds.max_x, grid.bounds.min_y);
    surface.stroke_rect(ul.x, ul.y, lr.x - ul.x, lr.y - ul.y, &OUTLINE_COLOR);
}
