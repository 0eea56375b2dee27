//! Grid fetchers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use heatmap_common::{BoundingBox, Grid, HeatmapError, HeatmapResult};
use reqwest::{Client, StatusCode, Url};
use solr_protocol::{decode_heatmap, select_url, SolrHeatmapQuery};
use tracing::{debug, instrument, warn};

use crate::config::LayerConfig;

/// Default request timeout for heatmap facet queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of density grids for a region.
#[async_trait]
pub trait GridFetcher: Send + Sync {
    /// Fetch the grid covering `bbox`.
    async fn fetch_grid(&self, bbox: BoundingBox) -> HeatmapResult<Grid>;
}

#[async_trait]
impl<F: GridFetcher + ?Sized> GridFetcher for Arc<F> {
    async fn fetch_grid(&self, bbox: BoundingBox) -> HeatmapResult<Grid> {
        (**self).fetch_grid(bbox).await
    }
}

/// Fetches heatmap facets from a Solr core over HTTP.
pub struct SolrGridFetcher {
    client: Client,
    base_url: String,
    field: String,
    query: BTreeMap<String, String>,
}

impl SolrGridFetcher {
    /// `base_url` is the core or collection URL, e.g.
    /// `http://localhost:8983/solr/places`.
    pub fn new(base_url: impl Into<String>, config: &LayerConfig) -> HeatmapResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                HeatmapError::InvalidConfig(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client, base_url, config))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, config: &LayerConfig) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            field: config.field.clone(),
            query: config.query.clone(),
        }
    }

    /// Full, encoded request URL for `bbox`.
    pub fn request_url(&self, bbox: BoundingBox) -> HeatmapResult<Url> {
        let query = SolrHeatmapQuery::new(self.field.clone(), self.query.clone(), bbox);
        Url::parse_with_params(&select_url(&self.base_url), query.to_params()).map_err(|e| {
            HeatmapError::InvalidConfig(format!("invalid Solr URL '{}': {}", self.base_url, e))
        })
    }
}

#[async_trait]
impl GridFetcher for SolrGridFetcher {
    #[instrument(skip_all, fields(field = %self.field, bbox = %bbox))]
    async fn fetch_grid(&self, bbox: BoundingBox) -> HeatmapResult<Grid> {
        let url = self.request_url(bbox)?;
        debug!(url = %url, "Requesting heatmap facet");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HeatmapError::fetch_transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Heatmap request rejected");
            return Err(HeatmapError::fetch_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HeatmapError::fetch_transport(format!("failed to read body: {}", e)))?;

        decode_heatmap(&body, &self.field)
    }
}
