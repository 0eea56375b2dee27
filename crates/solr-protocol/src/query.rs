//! Heatmap facet request parameters.

use std::collections::BTreeMap;

use heatmap_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// Encoding of the counts matrix in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeatmapFormat {
    /// Nested JSON arrays of integers
    #[default]
    #[serde(rename = "ints2D")]
    Ints2D,
}

impl HeatmapFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapFormat::Ints2D => "ints2D",
        }
    }

    /// Response key holding the counts in this format.
    pub fn counts_key(&self) -> &'static str {
        match self {
            HeatmapFormat::Ints2D => "counts_ints2D",
        }
    }
}

/// A `/select` request asking Solr for a heatmap facet and no documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolrHeatmapQuery {
    /// Spatial field to facet on (e.g. "geo")
    pub field: String,
    /// Extra request parameters such as `q` or `fq`, sent first
    pub params: BTreeMap<String, String>,
    /// Region to facet over; clamped to the geographic range on output
    pub bbox: BoundingBox,
    pub format: HeatmapFormat,
}

impl SolrHeatmapQuery {
    pub fn new(
        field: impl Into<String>,
        params: BTreeMap<String, String>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            field: field.into(),
            params,
            bbox,
            format: HeatmapFormat::default(),
        }
    }

    /// The `facet.heatmap.geom` rectangle: `[W S TO E N]` in Solr range syntax.
    pub fn geom(&self) -> String {
        let b = self.bbox.clamp_geographic();
        format!("[{} {} TO {} {}]", b.min_x, b.min_y, b.max_x, b.max_y)
    }

    /// Request parameters in send order, not yet URL-encoded.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        pairs.extend([
            ("rows".to_string(), "0".to_string()),
            ("facet".to_string(), "true".to_string()),
            ("facet.heatmap".to_string(), self.field.clone()),
            ("facet.heatmap.geom".to_string(), self.geom()),
            ("facet.heatmap.format".to_string(), self.format.as_str().to_string()),
            ("wt".to_string(), "json".to_string()),
        ]);
        pairs
    }
}

/// The select handler under a core/collection base URL.
pub fn select_url(base: &str) -> String {
    format!("{}/select", base.trim_end_matches('/'))
}
