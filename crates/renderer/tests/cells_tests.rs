//! Tests for the cell renderer against recorded and rasterized surfaces.

use heatmap_common::{BoundingBox, Grid, GridStats};
use renderer::{
    CellRenderer, ColorRamp, Curve, DrawOp, DrawingSurface, InterpolationMethod, ProjectionKind,
    RasterSurface, RecordingSurface, RenderOptions, Rgb, Viewport,
};
use test_utils::{assert_approx_eq, assert_color_near, hotspot_cells, striped_cells};

// ============================================================================
// Helper functions
// ============================================================================

/// 2x2 grid over (0,0)-(2,2) holding [[0, 10], [5, 2]].
fn two_by_two() -> Grid {
    Grid::new(
        BoundingBox::new(0.0, 0.0, 2.0, 2.0),
        2,
        2,
        vec![Some(vec![0.0, 10.0]), Some(vec![5.0, 2.0])],
    )
    .unwrap()
}

fn options(method: InterpolationMethod) -> RenderOptions {
    RenderOptions {
        ramp: ColorRamp::from_hex("#00ff00", "#ff0000").unwrap(),
        method,
        opacity: 0.5,
        blur_px: 10.0,
    }
}

/// A square viewport where one grid unit is 100 pixels.
fn viewport_for(grid: &Grid) -> Viewport {
    Viewport::new(
        grid.bounds,
        (grid.bounds.width() * 100.0) as u32,
        (grid.bounds.height() * 100.0) as u32,
        ProjectionKind::Equirectangular,
    )
}

fn fill_rect(op: &DrawOp) -> (f64, f64, f64, f64, Rgb) {
    match op {
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => (*x, *y, *width, *height, *color),
        other => panic!("expected a fill, got {:?}", other),
    }
}

// ============================================================================
// Painting
// ============================================================================

#[test]
fn test_two_by_two_linear() {
    let grid = two_by_two();
    let stats = grid.stats();
    assert_eq!(stats, GridStats { min: 0.0, max: 10.0 });

    let mut surface = RecordingSurface::new();
    let summary = CellRenderer::new(options(InterpolationMethod::Linear)).render(
        &grid,
        &stats,
        &viewport_for(&grid),
        &mut surface,
    );

    assert_eq!(summary.painted, 3);
    assert_eq!(summary.skipped, 1);

    let fills = surface.fills();
    assert_eq!(fills.len(), 3);

    // Row 0, column 1: the maximum, pure red at half opacity
    let (x, y, w, h, color) = fill_rect(fills[0]);
    assert_eq!((x, y, w, h), (100.0, 0.0, 100.0, 100.0));
    assert_color_near!(color, Rgb::new(255, 0, 0), 0);
    assert_approx_eq!(color.a, 0.5, 1e-12);

    // Row 1, column 0: halfway along the ramp, yellow
    let (x, y, _, _, color) = fill_rect(fills[1]);
    assert_eq!((x, y), (0.0, 100.0));
    assert_color_near!(color, Rgb::new(255, 255, 0), 1);
    assert_approx_eq!(color.a, 0.5, 1e-12);

    // Row 1, column 1: 0.2 along the ramp, still mostly green
    let (x, y, _, _, color) = fill_rect(fills[2]);
    assert_eq!((x, y), (100.0, 100.0));
    assert!(color.g == 255 && color.r < 255 && color.b == 0);

    assert_eq!(surface.blur(), Some(10.0));
}

#[test]
fn test_exp_and_log_shift_intensity() {
    let grid = two_by_two();
    let stats = grid.stats();
    let renderer_for = |method| CellRenderer::new(options(method));

    let mid_color = |method| {
        let mut surface = RecordingSurface::new();
        renderer_for(method).render(&grid, &stats, &viewport_for(&grid), &mut surface);
        fill_rect(surface.fills()[1]).4
    };

    // Green channel stays saturated; red tracks intensity along green->yellow
    let lin = mid_color(InterpolationMethod::Linear);
    let exp = mid_color(InterpolationMethod::Exp);
    let log = mid_color(InterpolationMethod::Log);
    assert!(exp.r < lin.r, "exp {:?} lin {:?}", exp, lin);
    assert_eq!(log.r, 255);
    assert!(log.g < 255, "log {:?}", log);
}

#[test]
fn test_absent_rows_advance_cursor() {
    let grid = Grid::new(
        BoundingBox::new(0.0, 0.0, 1.0, 3.0),
        3,
        1,
        vec![Some(vec![4.0]), None, Some(vec![4.0])],
    )
    .unwrap();
    let stats = grid.stats();

    let mut surface = RecordingSurface::new();
    let summary = CellRenderer::new(options(InterpolationMethod::Linear)).render(
        &grid,
        &stats,
        &viewport_for(&grid),
        &mut surface,
    );

    assert_eq!(summary.absent_rows, 1);
    let fills = surface.fills();
    assert_eq!(fills.len(), 2);
    assert_approx_eq!(fill_rect(fills[0]).1, 0.0, 1e-9);
    // Third row, not second
    assert_approx_eq!(fill_rect(fills[1]).1, 200.0, 1e-9);
}

#[test]
fn test_striped_grid_counts() {
    let grid = Grid::new(
        BoundingBox::new(0.0, 0.0, 4.0, 6.0),
        6,
        4,
        striped_cells(6, 4, 3.0, 3),
    )
    .unwrap();
    let stats = grid.stats();

    let mut surface = RecordingSurface::new();
    let summary = CellRenderer::new(RenderOptions::default()).render(
        &grid,
        &stats,
        &viewport_for(&grid),
        &mut surface,
    );

    assert_eq!(summary.absent_rows, 2);
    assert_eq!(summary.painted, 16);
}

// ============================================================================
// Empty and degenerate grids
// ============================================================================

#[test]
fn test_all_absent_grid_draws_nothing() {
    let grid = Grid::empty(BoundingBox::new(0.0, 0.0, 2.0, 2.0), 2, 2).unwrap();
    let stats = grid.stats();
    assert!(stats.is_empty());

    let mut surface = RecordingSurface::new();
    let summary = CellRenderer::new(RenderOptions::default()).render(
        &grid,
        &stats,
        &viewport_for(&grid),
        &mut surface,
    );

    assert_eq!(summary.painted, 0);
    assert!(surface.ops().is_empty(), "no fills and no blur expected");
}

#[test]
fn test_intensity_rules() {
    let renderer = CellRenderer::new(RenderOptions::default());
    let curve = Curve::new(0.0, 1.0, InterpolationMethod::Linear);
    let stats = GridStats { min: 0.0, max: 8.0 };

    assert_eq!(renderer.intensity(&curve, 0.0, &stats), None);
    assert_eq!(renderer.intensity(&curve, 2.0, &stats), Some(0.25));
    assert_eq!(renderer.intensity(&curve, f64::NAN, &stats), None);
    assert_eq!(
        renderer.intensity(&curve, 1.0, &GridStats { min: 0.0, max: 0.0 }),
        None
    );
}

// ============================================================================
// Rasterized output
// ============================================================================

#[test]
fn test_render_to_raster() {
    let grid = two_by_two();
    let stats = grid.stats();
    let mut options = options(InterpolationMethod::Linear);
    options.blur_px = 0.0;

    let mut surface = RasterSurface::new(200, 200).unwrap();
    CellRenderer::new(options).render(&grid, &stats, &viewport_for(&grid), &mut surface);

    assert_eq!(surface.pixel(50, 50).unwrap().a, 0.0);

    let red = surface.pixel(150, 50).unwrap();
    assert_color_near!(red, Rgb::new(255, 0, 0), 1);
    assert_approx_eq!(red.a, 0.5, 0.01);

    let yellow = surface.pixel(50, 150).unwrap();
    assert_color_near!(yellow, Rgb::new(255, 255, 0), 1);
}

#[test]
fn test_rerender_after_clear() {
    let grid = Grid::new(
        BoundingBox::new(-9.0, -9.0, 9.0, 9.0),
        9,
        9,
        hotspot_cells(9, 9, 250.0),
    )
    .unwrap();
    let stats = grid.stats();
    let renderer = CellRenderer::new(RenderOptions::default());
    let viewport = Viewport::new(grid.bounds, 90, 90, ProjectionKind::WebMercator);

    let mut surface = RecordingSurface::new();
    let first = renderer.render(&grid, &stats, &viewport, &mut surface);
    surface.clear();
    let second = renderer.render(&grid, &stats, &viewport, &mut surface);

    assert_eq!(first, second);
    assert_eq!(surface.fills().len(), second.painted);
}
