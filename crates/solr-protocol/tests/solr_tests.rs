//! Tests for Solr heatmap requests and response decoding.

use std::collections::BTreeMap;

use heatmap_common::{BoundingBox, HeatmapError};
use solr_protocol::{decode_heatmap, select_url, SolrHeatmapQuery};
use test_utils::assert_approx_eq;

// ============================================================================
// Request parameters
// ============================================================================

fn query_params() -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("q".to_string(), "*:*".to_string());
    params.insert("fq".to_string(), "type:store".to_string());
    params
}

#[test]
fn test_params_in_send_order() {
    let bbox = BoundingBox::new(-10.0, 20.0, 30.0, 40.0);
    let query = SolrHeatmapQuery::new("geo", query_params(), bbox);
    let params = query.to_params();
    let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();

    assert_eq!(
        keys,
        vec![
            "fq",
            "q",
            "rows",
            "facet",
            "facet.heatmap",
            "facet.heatmap.geom",
            "facet.heatmap.format",
            "wt"
        ]
    );
    assert!(params.contains(&("rows".to_string(), "0".to_string())));
    assert!(params.contains(&("facet.heatmap".to_string(), "geo".to_string())));
    assert!(params.contains(&("facet.heatmap.geom".to_string(), "[-10 20 TO 30 40]".to_string())));
    assert!(params.contains(&("facet.heatmap.format".to_string(), "ints2D".to_string())));
    assert!(params.contains(&("wt".to_string(), "json".to_string())));
}

#[test]
fn test_world_wrapping_viewport_is_clamped() {
    // A zoomed-out map can report bounds well past the antimeridian
    let bbox = BoundingBox::new(-540.0, -120.0, 540.0, 120.0);
    let query = SolrHeatmapQuery::new("loc", BTreeMap::new(), bbox);
    assert_eq!(query.geom(), "[-180 -90 TO 180 90]");
}

#[test]
fn test_select_url() {
    assert_eq!(
        select_url("http://localhost:8983/solr/geo"),
        "http://localhost:8983/solr/geo/select"
    );
}

// ============================================================================
// Response decoding
// ============================================================================

const RESPONSE: &str = r#"{
  "responseHeader": {"status": 0, "QTime": 3},
  "response": {"numFound": 42, "start": 0, "docs": []},
  "facet_counts": {
    "facet_queries": {},
    "facet_fields": {},
    "facet_heatmaps": {
      "geo": [
        "gridLevel", 2,
        "columns", 3,
        "rows", 2,
        "minX", -180.0,
        "maxX", 180.0,
        "minY", -90.0,
        "maxY", 90.0,
        "counts_ints2D", [[0, 5, 12], null]
      ]
    }
  }
}"#;

#[test]
fn test_decode_full_response() {
    let grid = decode_heatmap(RESPONSE, "geo").unwrap();

    assert_eq!(grid.rows, 2);
    assert_eq!(grid.columns, 3);
    assert_eq!(grid.grid_level, Some(2));
    assert_eq!(grid.bounds, BoundingBox::new(-180.0, -90.0, 180.0, 90.0));
    assert_eq!(grid.cells, vec![Some(vec![0.0, 5.0, 12.0]), None]);

    let stats = grid.stats();
    assert_approx_eq!(stats.min, 0.0, 1e-12);
    assert_approx_eq!(stats.max, 12.0, 1e-12);
}

#[test]
fn test_null_counts_decode_to_empty_grid() {
    let body = r#"{"facet_counts": {"facet_heatmaps": {"geo": [
        "gridLevel", 3, "columns", 4, "rows", 2,
        "minX", 0, "maxX", 4, "minY", 0, "maxY", 2,
        "counts_ints2D", null
    ]}}}"#;

    let grid = decode_heatmap(body, "geo").unwrap();
    assert_eq!(grid.cells, vec![None, None]);
    assert!(!grid.has_data());
    assert!(grid.stats().is_empty());
}

#[test]
fn test_wrong_field_is_invalid_response() {
    let err = decode_heatmap(RESPONSE, "location").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidResponse(ref m) if m.contains("location")));
}

#[test]
fn test_shape_mismatch_is_invalid_response() {
    let body = r#"{"facet_counts": {"facet_heatmaps": {"geo": [
        "columns", 2, "rows", 1,
        "minX", 0, "maxX", 2, "minY", 0, "maxY", 1,
        "counts_ints2D", [[1, 2, 3]]
    ]}}}"#;

    let err = decode_heatmap(body, "geo").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidResponse(_)));
}

#[test]
fn test_oversized_null_grid_is_invalid_response() {
    let body = r#"{"facet_counts": {"facet_heatmaps": {"geo": [
        "columns", 1, "rows", 1000000000000000000,
        "minX", 0, "maxX", 1, "minY", 0, "maxY", 1,
        "counts_ints2D", null
    ]}}}"#;

    let err = decode_heatmap(body, "geo").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidResponse(ref m) if m.contains("exceeds")));
    assert!(err.is_cycle_failure());
}

#[test]
fn test_negative_rows_is_invalid_response() {
    let body = r#"{"facet_counts": {"facet_heatmaps": {"geo": [
        "columns", 1, "rows", -2,
        "minX", 0, "maxX", 1, "minY", 0, "maxY", 1,
        "counts_ints2D", null
    ]}}}"#;

    let err = decode_heatmap(body, "geo").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidResponse(ref m) if m.contains("rows")));
}

#[test]
fn test_malformed_json_is_invalid_response() {
    let err = decode_heatmap("{not json", "geo").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidResponse(_)));
    assert!(err.is_cycle_failure());
}
