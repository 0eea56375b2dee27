//! Sparse density grids returned by the heatmap facet.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, HeatmapResult};
use crate::BoundingBox;

/// Largest `rows * columns` a grid may declare. Solr caps facet grids far
/// below this through `facet.heatmap.maxCells`.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// A sparse 2D grid of density counts over a geographic bounding box.
///
/// Row 0 is the northernmost band (starting at `bounds.max_y`), column 0 the
/// westernmost (starting at `bounds.min_x`). A row with no data for its
/// latitude band is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Geographic extent covered by the grid
    pub bounds: BoundingBox,
    /// Number of rows (latitude bands)
    pub rows: usize,
    /// Number of columns (longitude bands)
    pub columns: usize,
    /// Row-major cells, `rows` entries each absent or `columns` long
    pub cells: Vec<Option<Vec<f64>>>,
    /// Prefix-tree level the server computed the grid at, when reported
    #[serde(default)]
    pub grid_level: Option<u32>,
}

impl Grid {
    /// Create a grid, checking that the cell matrix matches its shape.
    pub fn new(
        bounds: BoundingBox,
        rows: usize,
        columns: usize,
        cells: Vec<Option<Vec<f64>>>,
    ) -> HeatmapResult<Self> {
        let grid = Self {
            bounds,
            rows,
            columns,
            cells,
            grid_level: None,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Create a grid where every row is absent.
    pub fn empty(bounds: BoundingBox, rows: usize, columns: usize) -> HeatmapResult<Self> {
        check_shape(rows, columns)?;
        Ok(Self {
            bounds,
            rows,
            columns,
            cells: vec![None; rows],
            grid_level: None,
        })
    }

    /// Attach the server-reported grid level.
    pub fn with_grid_level(mut self, level: u32) -> Self {
        self.grid_level = Some(level);
        self
    }

    /// Check the `rows`/`columns` invariant against the cell matrix.
    pub fn validate(&self) -> HeatmapResult<()> {
        check_shape(self.rows, self.columns)?;

        if self.cells.len() != self.rows {
            return Err(HeatmapError::invalid_response(format!(
                "grid declares {} rows but has {}",
                self.rows,
                self.cells.len()
            )));
        }

        for (i, row) in self.cells.iter().enumerate() {
            if let Some(row) = row {
                if row.len() != self.columns {
                    return Err(HeatmapError::invalid_response(format!(
                        "row {} has {} columns, expected {}",
                        i,
                        row.len(),
                        self.columns
                    )));
                }
            }
        }

        Ok(())
    }

    /// Width and height of one cell in degrees.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.bounds.width() / self.columns as f64,
            self.bounds.height() / self.rows as f64,
        )
    }

    /// Iterate over every present cell value.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().flatten().flat_map(|row| row.iter().copied())
    }

    /// Whether at least one cell value is present.
    pub fn has_data(&self) -> bool {
        self.values().next().is_some()
    }

    /// Compute min/max over the present values.
    pub fn stats(&self) -> GridStats {
        compute_stats(self)
    }
}

fn check_shape(rows: usize, columns: usize) -> HeatmapResult<()> {
    match rows.checked_mul(columns) {
        Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
        _ => Err(HeatmapError::invalid_response(format!(
            "grid of {} x {} cells exceeds the limit of {}",
            rows, columns, MAX_GRID_CELLS
        ))),
    }
}

/// Minimum and maximum over the present values of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
}

impl GridStats {
    /// The "no data" sentinel: `min = +inf`, `max = -inf`.
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// True when no value has been observed.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Fold one value into the running min/max.
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl Default for GridStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Scan every present row and value of `grid` for its min and max.
///
/// Absent rows contribute nothing. Returns [`GridStats::empty`] when the grid
/// holds no values.
pub fn compute_stats(grid: &Grid) -> GridStats {
    grid.values().fold(GridStats::empty(), |mut stats, v| {
        stats.observe(v);
        stats
    })
}
