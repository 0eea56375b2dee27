//! Solr spatial heatmap faceting.
//!
//! Supports:
//! - Building `facet.heatmap` select requests for a viewport
//! - Decoding the `facet_heatmaps` section of a JSON response into a [`Grid`]
//!
//! [`Grid`]: heatmap_common::Grid

pub mod query;
pub mod response;

pub use query::{select_url, HeatmapFormat, SolrHeatmapQuery};
pub use response::{decode_heatmap, decode_heatmap_value, HeatmapFacet};
