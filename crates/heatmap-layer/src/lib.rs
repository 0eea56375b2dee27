//! Solr heatmap map layer.
//!
//! Wires the pieces together for an interactive map:
//! - [`config`]: layer options with JSON / environment loading
//! - [`fetch`]: the [`GridFetcher`] seam and its Solr HTTP implementation
//! - [`scheduler`]: debounced, token-checked fetch and paint cycle
//!
//! The host map forwards [`MapEvent`]s and owns nothing else; the scheduler
//! owns the drawing surface.

pub mod config;
pub mod fetch;
pub mod scheduler;

pub use config::LayerConfig;
pub use fetch::{GridFetcher, SolrGridFetcher};
pub use scheduler::{
    CycleOutcome, FetchRequest, MapEvent, MapView, RenderScheduler, RequestToken, SchedulerState,
    SchedulerStats,
};
