//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, HeatmapResult};

/// Valid longitude range in degrees.
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// Valid latitude range in degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// A geographic bounding box in degrees.
///
/// `min_x`/`max_x` are west/east longitudes, `min_y`/`max_y` are
/// south/north latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a bbox string: "west,south,east,north"
    pub fn from_bbox_string(s: &str) -> HeatmapResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(HeatmapError::InvalidBbox(format!(
                "{}. Expected 'west,south,east,north'",
                s
            )));
        }

        let parse = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| HeatmapError::InvalidBbox(format!("invalid number: {}", part)))
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Clamp to the valid geographic range.
    ///
    /// Only the outward edges are clamped: west/south are raised to
    /// -180/-90 and east/north are lowered to 180/90. A map panned across
    /// the antimeridian therefore still yields a box the search service
    /// accepts.
    pub fn clamp_geographic(&self) -> Self {
        Self {
            min_x: self.min_x.max(LON_RANGE.0),
            min_y: self.min_y.max(LAT_RANGE.0),
            max_x: self.max_x.min(LON_RANGE.1),
            max_y: self.max_y.min(LAT_RANGE.1),
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
