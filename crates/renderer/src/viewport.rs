//! A fixed viewport: geographic bounds mapped onto a pixel rectangle.
//!
//! Hosts with a live map supply their own [`Projection`]. `Viewport` covers
//! headless rendering (offscreen tiles, tests) with the two projections
//! slippy maps use.

use std::f64::consts::PI;

use heatmap_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::surface::{Projection, ScreenPoint};

/// Latitude limit of the Web Mercator square, in degrees.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// How latitude maps to the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Plate carrée: latitude linear in y
    Equirectangular,
    /// Spherical Mercator (EPSG:3857), as used by web map tiles
    #[default]
    WebMercator,
}

/// Geographic bounds displayed on a `width` x `height` pixel surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: BoundingBox,
    width: u32,
    height: u32,
    kind: ProjectionKind,
}

impl Viewport {
    pub fn new(bounds: BoundingBox, width: u32, height: u32, kind: ProjectionKind) -> Self {
        Self {
            bounds,
            width,
            height,
            kind,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    fn project_y(&self, lat: f64) -> f64 {
        match self.kind {
            ProjectionKind::Equirectangular => lat,
            ProjectionKind::WebMercator => mercator_y(lat),
        }
    }
}

/// Mercator northing in radians for a latitude in degrees.
fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
    (PI / 4.0 + lat / 2.0).tan().ln()
}

impl Projection for Viewport {
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        let x = (lng - self.bounds.min_x) / self.bounds.width() * self.width as f64;

        let top = self.project_y(self.bounds.max_y);
        let bottom = self.project_y(self.bounds.min_y);
        let y = (top - self.project_y(lat)) / (top - bottom) * self.height as f64;

        ScreenPoint::new(x, y)
    }
}
