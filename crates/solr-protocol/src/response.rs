//! Decoding of `facet_counts.facet_heatmaps` from a Solr JSON response.
//!
//! Solr's JSON writer renders the heatmap as a flat named list:
//!
//! ```json
//! "geo": ["gridLevel", 2, "columns", 4, "rows", 2,
//!         "minX", -180.0, "maxX", 180.0, "minY", -90.0, "maxY", 90.0,
//!         "counts_ints2D", [[0, 1, 0, 0], null]]
//! ```
//!
//! `counts_ints2D` is `null` when the region holds no documents, and any row
//! without counts is `null` as well.

use heatmap_common::{BoundingBox, Grid, HeatmapError, HeatmapResult};
use serde_json::Value;
use tracing::debug;

use crate::query::HeatmapFormat;

/// A heatmap facet as named fields, before conversion to a [`Grid`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapFacet {
    pub grid_level: Option<u32>,
    pub columns: usize,
    pub rows: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// `None` when the server sent no counts at all
    pub counts: Option<Vec<Option<Vec<f64>>>>,
}

impl HeatmapFacet {
    /// Read a facet from its flat `[key, value, ...]` list.
    ///
    /// Unknown keys are ignored, as is a trailing key with no value.
    pub fn from_named_list(list: &[Value], format: HeatmapFormat) -> HeatmapResult<Self> {
        let mut grid_level = None;
        let mut columns = None;
        let mut rows = None;
        let mut min_x = None;
        let mut max_x = None;
        let mut min_y = None;
        let mut max_y = None;
        let mut counts = None;

        for pair in list.chunks_exact(2) {
            let key = pair[0].as_str().ok_or_else(|| {
                HeatmapError::invalid_response(format!("heatmap key {} is not a string", pair[0]))
            })?;
            let value = &pair[1];

            match key {
                "gridLevel" => grid_level = Some(as_u32(key, value)?),
                "columns" => columns = Some(as_usize(key, value)?),
                "rows" => rows = Some(as_usize(key, value)?),
                "minX" => min_x = Some(as_f64(key, value)?),
                "maxX" => max_x = Some(as_f64(key, value)?),
                "minY" => min_y = Some(as_f64(key, value)?),
                "maxY" => max_y = Some(as_f64(key, value)?),
                k if k == format.counts_key() => counts = decode_counts(value)?,
                _ => {}
            }
        }

        Ok(HeatmapFacet {
            grid_level,
            columns: required("columns", columns)?,
            rows: required("rows", rows)?,
            min_x: required("minX", min_x)?,
            max_x: required("maxX", max_x)?,
            min_y: required("minY", min_y)?,
            max_y: required("maxY", max_y)?,
            counts,
        })
    }

    /// Convert to a [`Grid`], checking the counts against the declared shape.
    pub fn into_grid(self) -> HeatmapResult<Grid> {
        let bounds = BoundingBox::new(self.min_x, self.min_y, self.max_x, self.max_y);

        let grid = match self.counts {
            Some(cells) => Grid::new(bounds, self.rows, self.columns, cells)?,
            None => Grid::empty(bounds, self.rows, self.columns)?,
        };

        Ok(match self.grid_level {
            Some(level) => grid.with_grid_level(level),
            None => grid,
        })
    }
}

/// Decode the heatmap for `field` from a raw Solr response body.
pub fn decode_heatmap(body: &str, field: &str) -> HeatmapResult<Grid> {
    let response: Value = serde_json::from_str(body)?;
    decode_heatmap_value(&response, field)
}

/// Decode the heatmap for `field` from an already parsed response.
pub fn decode_heatmap_value(response: &Value, field: &str) -> HeatmapResult<Grid> {
    let list = response
        .pointer("/facet_counts/facet_heatmaps")
        .and_then(|heatmaps| heatmaps.get(field))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            HeatmapError::invalid_response(format!(
                "no facet_counts.facet_heatmaps.{} in response",
                field
            ))
        })?;

    let facet = HeatmapFacet::from_named_list(list, HeatmapFormat::Ints2D)?;
    let grid = facet.into_grid()?;

    debug!(
        field = field,
        rows = grid.rows,
        columns = grid.columns,
        grid_level = ?grid.grid_level,
        has_data = grid.has_data(),
        "Decoded heatmap facet"
    );

    Ok(grid)
}

fn required<T>(key: &str, value: Option<T>) -> HeatmapResult<T> {
    value.ok_or_else(|| HeatmapError::invalid_response(format!("heatmap is missing {}", key)))
}

fn as_usize(key: &str, value: &Value) -> HeatmapResult<usize> {
    value
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| out_of_range(key, value))
}

fn as_u32(key: &str, value: &Value) -> HeatmapResult<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| out_of_range(key, value))
}

fn out_of_range(key: &str, value: &Value) -> HeatmapError {
    HeatmapError::invalid_response(format!(
        "{} must be a non-negative integer in range, got {}",
        key, value
    ))
}

fn as_f64(key: &str, value: &Value) -> HeatmapResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| {
            HeatmapError::invalid_response(format!("{} must be a number, got {}", key, value))
        })
}

fn decode_counts(value: &Value) -> HeatmapResult<Option<Vec<Option<Vec<f64>>>>> {
    let rows = match value {
        Value::Null => return Ok(None),
        Value::Array(rows) => rows,
        other => {
            return Err(HeatmapError::invalid_response(format!(
                "counts must be an array or null, got {}",
                other
            )))
        }
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Null => Ok(None),
            Value::Array(cells) => cells
                .iter()
                .map(|c| {
                    c.as_f64().ok_or_else(|| {
                        HeatmapError::invalid_response(format!(
                            "row {} holds non-numeric count {}",
                            i, c
                        ))
                    })
                })
                .collect::<HeatmapResult<Vec<f64>>>()
                .map(Some),
            other => Err(HeatmapError::invalid_response(format!(
                "row {} must be an array or null, got {}",
                i, other
            ))),
        })
        .collect::<HeatmapResult<Vec<_>>>()
        .map(Some)
}
