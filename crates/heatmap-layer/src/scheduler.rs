//! Debounced fetch-and-paint cycle driven by map events.
//!
//! ```text
//! Idle --viewport change--> Scheduled --debounce--> Fetching --response--> (paint) --> Idle
//!             ^                 |  ^                     |
//!             |                 |  +-- viewport change --+   (in-flight response goes stale)
//!             +--- zoom start --+----- zoom start -------+
//! ```
//!
//! Painting happens synchronously inside [`RenderScheduler::on_response`],
//! so no event can interleave with it. A request that was superseded is
//! never aborted; its response is recognized by its [`RequestToken`] and
//! dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use heatmap_common::{BoundingBox, Grid, HeatmapError, HeatmapResult};
use renderer::{render_outline, CellRenderer, DrawingSurface, Projection, RenderSummary, Viewport};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::config::LayerConfig;
use crate::fetch::GridFetcher;

type Fetch = BoxFuture<'static, (RequestToken, HeatmapResult<Grid>)>;

/// The host map's current view: what is visible and how to project it.
pub trait MapView: Projection {
    fn bounds(&self) -> BoundingBox;
}

impl MapView for Viewport {
    fn bounds(&self) -> BoundingBox {
        Viewport::bounds(self)
    }
}

/// Lifecycle events forwarded from the host map.
#[derive(Debug, Clone)]
pub enum MapEvent<V> {
    /// The map finished a pan or zoom step and now shows `V`.
    ViewportChanged(V),
    /// A zoom animation started; the overlay would be misaligned.
    ZoomStart,
}

/// Identifies one fetch cycle. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch the caller must perform and report back with
/// [`RenderScheduler::on_response`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone)]
pub enum SchedulerState<V> {
    Idle,
    Scheduled { deadline: Instant, view: V },
    Fetching { token: RequestToken, view: V },
}

impl<V> SchedulerState<V> {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Scheduled { .. } => "scheduled",
            SchedulerState::Fetching { .. } => "fetching",
        }
    }
}

/// What became of a fetch response.
#[derive(Debug)]
pub enum CycleOutcome {
    Painted(RenderSummary),
    /// A newer event superseded this request; nothing was drawn.
    Stale(RequestToken),
    /// The fetch failed; the surface was left cleared.
    Failed(HeatmapError),
}

/// Counters over the scheduler's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub fetches_issued: u64,
    pub paints: u64,
    pub stale_discarded: u64,
    pub failures: u64,
}

/// Owns the drawing surface and decides when to fetch and paint.
pub struct RenderScheduler<V, S> {
    renderer: CellRenderer,
    surface: S,
    debounce: Duration,
    outline: bool,
    state: SchedulerState<V>,
    next_token: u64,
    stats: SchedulerStats,
    outcomes: Option<mpsc::UnboundedSender<(RequestToken, CycleOutcome)>>,
}

impl<V, S> RenderScheduler<V, S>
where
    V: MapView,
    S: DrawingSurface,
{
    /// Build a scheduler from a validated layer configuration.
    pub fn new(config: &LayerConfig, surface: S) -> HeatmapResult<Self> {
        config.validate()?;
        Ok(Self {
            renderer: CellRenderer::new(config.style()?),
            surface,
            debounce: config.debounce(),
            outline: false,
            state: SchedulerState::Idle,
            next_token: 0,
            stats: SchedulerStats::default(),
            outcomes: None,
        })
    }

    /// Also stroke the grid's bounding box after each paint.
    pub fn with_outline(mut self, outline: bool) -> Self {
        self.outline = outline;
        self
    }

    /// Report every response handled by [`run`](Self::run) on `sender`.
    pub fn with_outcomes(
        mut self,
        sender: mpsc::UnboundedSender<(RequestToken, CycleOutcome)>,
    ) -> Self {
        self.outcomes = Some(sender);
        self
    }

    pub fn state(&self) -> &SchedulerState<V> {
        &self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// When the pending debounce timer fires, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            SchedulerState::Scheduled { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    pub fn handle_event(&mut self, event: MapEvent<V>) {
        match event {
            MapEvent::ViewportChanged(view) => self.viewport_changed(view),
            MapEvent::ZoomStart => self.zoom_start(),
        }
    }

    /// Restart the debounce for `view`. Any pending timer is replaced and
    /// any in-flight request becomes stale.
    pub fn viewport_changed(&mut self, view: V) {
        self.surface.clear();
        let deadline = Instant::now() + self.debounce;
        debug!(
            from = self.state.name(),
            bounds = %view.bounds(),
            debounce_ms = self.debounce.as_millis() as u64,
            "Viewport changed, render scheduled"
        );
        self.state = SchedulerState::Scheduled { deadline, view };
    }

    /// Clear immediately and drop any pending timer or request.
    pub fn zoom_start(&mut self) {
        self.surface.clear();
        debug!(from = self.state.name(), "Zoom started, render cancelled");
        self.state = SchedulerState::Idle;
    }

    /// The debounce timer elapsed: move to `Fetching` and hand back the
    /// request to issue. Returns `None` unless a render is scheduled.
    pub fn fire_timer(&mut self) -> Option<FetchRequest> {
        let view = match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Scheduled { view, .. } => view,
            other => {
                self.state = other;
                return None;
            }
        };

        self.next_token += 1;
        let token = RequestToken(self.next_token);
        let request = FetchRequest {
            token,
            bounds: view.bounds(),
        };
        self.stats.fetches_issued += 1;
        debug!(token = %token, bounds = %request.bounds, "Issuing heatmap fetch");

        self.state = SchedulerState::Fetching { token, view };
        Some(request)
    }

    /// Handle the response for `token`: paint it if it is still current,
    /// otherwise discard it.
    pub fn on_response(
        &mut self,
        token: RequestToken,
        result: HeatmapResult<Grid>,
    ) -> CycleOutcome {
        let view = match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Fetching { token: current, view } if current == token => view,
            other => {
                warn!(token = %token, state = other.name(), "Discarding stale heatmap response");
                self.state = other;
                self.stats.stale_discarded += 1;
                return CycleOutcome::Stale(token);
            }
        };

        self.surface.clear();

        let grid = match result {
            Ok(grid) => grid,
            Err(e) => {
                if e.is_cycle_failure() {
                    warn!(token = %token, error = %e, "Heatmap fetch failed");
                } else {
                    error!(token = %token, error = %e, "Heatmap fetcher misconfigured");
                }
                self.stats.failures += 1;
                return CycleOutcome::Failed(e);
            }
        };

        let stats = grid.stats();
        let summary = self.renderer.render(&grid, &stats, &view, &mut self.surface);
        if self.outline {
            render_outline(&grid, &view, &mut self.surface);
        }
        self.stats.paints += 1;

        info!(
            token = %token,
            painted = summary.painted,
            min = stats.min,
            max = stats.max,
            "Heatmap painted"
        );
        CycleOutcome::Painted(summary)
    }
}

impl<V, S> RenderScheduler<V, S>
where
    V: MapView + Send + 'static,
    S: DrawingSurface + Send + 'static,
{
    /// Drive the scheduler from `events` until the sender side closes.
    ///
    /// Fetches run concurrently with event handling; their results are fed
    /// back through [`on_response`](Self::on_response), and each outcome is
    /// sent to the [`with_outcomes`](Self::with_outcomes) receiver if one
    /// was given. Once the channel closes, a pending debounce still fires and
    /// in-flight responses are still awaited, so the returned scheduler is
    /// settled.
    pub async fn run<F>(
        mut self,
        fetcher: Arc<F>,
        mut events: mpsc::Receiver<MapEvent<V>>,
    ) -> Self
    where
        F: GridFetcher + ?Sized + 'static,
    {
        let mut in_flight: FuturesUnordered<Fetch> = FuturesUnordered::new();
        let mut open = true;

        info!(debounce_ms = self.debounce.as_millis() as u64, "Heatmap scheduler started");

        loop {
            let deadline = self.deadline();
            if !open && deadline.is_none() && in_flight.is_empty() {
                break;
            }

            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("Map event channel closed");
                        open = false;
                    }
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(request) = self.fire_timer() {
                        let fetcher = fetcher.clone();
                        in_flight.push(
                            async move {
                                let result = fetcher.fetch_grid(request.bounds).await;
                                (request.token, result)
                            }
                            .boxed(),
                        );
                    }
                },

                Some((token, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    let outcome = self.on_response(token, result);
                    if let Some(sender) = &self.outcomes {
                        if sender.send((token, outcome)).is_err() {
                            debug!("Outcome receiver dropped");
                            self.outcomes = None;
                        }
                    }
                }
            }
        }

        info!(
            fetches = self.stats.fetches_issued,
            paints = self.stats.paints,
            stale = self.stats.stale_discarded,
            failures = self.stats.failures,
            "Heatmap scheduler stopped"
        );
        self
    }
}
