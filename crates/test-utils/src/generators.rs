//! Synthetic density grids for tests.
//!
//! Generators return the raw row matrix (`rows` entries, each absent or
//! `columns` long) so callers can wrap it in whichever grid type they test.

/// A single rounded gaussian hotspot centred in the grid.
///
/// The centre cell holds `peak` for odd dimensions; counts fall off with
/// distance and are rounded to whole numbers like facet counts.
///
/// ```
/// use test_utils::hotspot_cells;
///
/// let cells = hotspot_cells(5, 5, 100.0);
/// assert_eq!(cells.len(), 5);
/// assert_eq!(cells[2].as_ref().unwrap()[2], 100.0);
/// ```
pub fn hotspot_cells(rows: usize, columns: usize, peak: f64) -> Vec<Option<Vec<f64>>> {
    let cy = (rows / 2) as f64;
    let cx = (columns / 2) as f64;
    let sigma = (rows.max(columns) as f64 / 4.0).max(0.5);

    (0..rows)
        .map(|row| {
            let cells = (0..columns)
                .map(|col| {
                    let dy = row as f64 - cy;
                    let dx = col as f64 - cx;
                    let d2 = dx * dx + dy * dy;
                    (peak * (-d2 / (2.0 * sigma * sigma)).exp()).round()
                })
                .collect();
            Some(cells)
        })
        .collect()
}

/// Rows of constant `value`, with every `absent_every`-th row missing.
///
/// Row indices `0, absent_every, 2*absent_every, ...` are absent.
pub fn striped_cells(
    rows: usize,
    columns: usize,
    value: f64,
    absent_every: usize,
) -> Vec<Option<Vec<f64>>> {
    (0..rows)
        .map(|row| {
            if absent_every > 0 && row % absent_every == 0 {
                None
            } else {
                Some(vec![value; columns])
            }
        })
        .collect()
}
