// src/services/viewport_controller.rs
// DOCUMENTATION: Map data orchestration
// PURPOSE: Own filter/region/query/selection state, drive debounced fetches, and
// publish immutable snapshots with the merged, zoom-filtered marker set

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{
    CatalogFilter, CatalogSearch, ExternalPlace, LatLng, Marker, MarkerSet, Place, RateRequest,
    RatingSubmission, SearchQuery, Viewport,
};
use crate::services::{
    CatalogApi, DebounceChannel, Debouncer, Deduplicator, FetchChannel, GeoMath, MapPress,
    PlaceProvider, Platform, RatingAggregator, RequestSequencer, Selection, MAX_NEARBY_RADIUS_M,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use validator::Validate;

/// Provider nearby search runs only above this zoom (strictly)
pub const EXTERNAL_FETCH_MIN_ZOOM: f64 = 12.0;

/// Provider markers are rendered from this zoom on
pub const EXTERNAL_MARKER_MIN_ZOOM: f64 = 13.0;

pub const EXTERNAL_MARKER_CAP: usize = 20;

/// Internal markers are capped unless zoomed in past INTERNAL_UNCAPPED_ZOOM
pub const INTERNAL_MARKER_CAP: usize = 10;
pub const INTERNAL_UNCAPPED_ZOOM: f64 = 15.0;

/// Radius for the catalog's nearby mode
pub const NEARBY_CATALOG_RADIUS_M: u32 = 10_000;

/// Zoom assumed before the first region event
pub const DEFAULT_ZOOM: f64 = 15.0;

/// What the internal catalog is listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CatalogMode {
    #[default]
    Popular,
    Recent,
    Historical,
    Nearby { center: LatLng },
    Text { search: CatalogSearch },
}

/// Controller lifecycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum ViewPhase {
    #[default]
    Idle,
    FetchingInternal,
    FetchingExternal,
    Ready,
    Error(String),
}

/// Immutable state published after every transition
/// DOCUMENTATION: Readers hold an Arc; each transition publishes a new one
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub phase: ViewPhase,
    pub mode: CatalogMode,
    pub query: SearchQuery,
    pub viewport: Option<Viewport>,
    pub zoom_level: f64,
    pub radius_meters: Option<f64>,
    /// Enriched internal places from the last successful catalog fetch
    pub places: Vec<Place>,
    /// Raw provider nearby results for the current viewport
    pub nearby_places: Vec<ExternalPlace>,
    /// Provider text search results (never merged into the map)
    pub search_results: Vec<ExternalPlace>,
    pub is_searching: bool,
    pub selection: Selection,
    /// Non-blocking advisory for the last failure
    pub notice: Option<String>,
    #[serde(skip)]
    has_loaded: bool,
    #[serde(skip)]
    fetching_internal: bool,
    #[serde(skip)]
    fetching_external: bool,
    /// Search result picked by the user, kept selectable after results are cleared
    #[serde(skip)]
    focused_result: Option<ExternalPlace>,
}

impl Default for MapSnapshot {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Idle,
            mode: CatalogMode::default(),
            query: SearchQuery::default(),
            viewport: None,
            zoom_level: DEFAULT_ZOOM,
            radius_meters: None,
            places: Vec::new(),
            nearby_places: Vec::new(),
            search_results: Vec::new(),
            is_searching: false,
            selection: Selection::None,
            notice: None,
            has_loaded: false,
            fetching_internal: false,
            fetching_external: false,
            focused_result: None,
        }
    }
}

impl MapSnapshot {
    /// Provider places that survive deduplication against the current internal set
    pub fn external_places(&self) -> Vec<ExternalPlace> {
        Deduplicator::merge(&self.places, &self.nearby_places)
    }

    /// Markers to render at the current zoom
    /// DOCUMENTATION: First 10 internal places unless zoom > 15; provider places only
    /// at zoom >= 13, deduplicated, capped to 20. Places without a coordinate are skipped.
    pub fn visible_markers(&self) -> MarkerSet {
        let internal_pool = if self.zoom_level > INTERNAL_UNCAPPED_ZOOM {
            &self.places[..]
        } else {
            &self.places[..self.places.len().min(INTERNAL_MARKER_CAP)]
        };

        let internal = internal_pool.iter().filter_map(Marker::from_place).collect();

        let external = if self.zoom_level >= EXTERNAL_MARKER_MIN_ZOOM {
            self.external_places()
                .iter()
                .take(EXTERNAL_MARKER_CAP)
                .map(Marker::from_external)
                .collect()
        } else {
            Vec::new()
        };

        MarkerSet { internal, external }
    }

    fn settle_phase(&mut self) {
        if self.fetching_internal {
            self.phase = ViewPhase::FetchingInternal;
        } else if self.fetching_external {
            self.phase = ViewPhase::FetchingExternal;
        } else if self.has_loaded || !matches!(self.phase, ViewPhase::Error(_)) {
            self.phase = ViewPhase::Ready;
        }
    }

    fn heal_selection(&mut self) {
        let pinned: &[ExternalPlace] = match &self.focused_result {
            Some(place) => std::slice::from_ref(place),
            None => &[],
        };

        self.selection = self.selection.reconcile(
            &self.places,
            &[
                self.nearby_places.as_slice(),
                self.search_results.as_slice(),
                pinned,
            ],
        );

        let still_focused = match (&self.selection, &self.focused_result) {
            (Selection::SelectedExternal(selected), Some(focused)) => {
                selected.provider_id == focused.provider_id
            }
            _ => false,
        };
        if !still_focused {
            self.focused_result = None;
        }
    }
}

/// Result of a region change, returned immediately
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionUpdate {
    pub zoom_level: f64,
    pub radius_meters: f64,
    /// Whether the debounced fetch will call the provider
    pub will_fetch_external: bool,
}

/// Tunables for a controller
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub viewport_width_px: f64,
    pub region_debounce: Duration,
    pub text_search_debounce: Duration,
    pub nearby_categories: String,
    pub nearby_catalog_radius_m: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            viewport_width_px: 390.0,
            region_debounce: Duration::from_millis(500),
            text_search_debounce: Duration::from_millis(500),
            nearby_categories: "tourist_attraction|museum|park|restaurant|point_of_interest"
                .to_string(),
            nearby_catalog_radius_m: NEARBY_CATALOG_RADIUS_M,
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            viewport_width_px: config.viewport_width_px,
            region_debounce: Duration::from_millis(config.region_debounce_ms),
            text_search_debounce: Duration::from_millis(config.text_search_debounce_ms),
            nearby_categories: config.nearby_categories.clone(),
            nearby_catalog_radius_m: NEARBY_CATALOG_RADIUS_M,
        }
    }
}

/// Zoom/radius gate for the provider nearby call
/// DOCUMENTATION: A radius above the provider maximum skips the call instead of clamping
pub fn should_fetch_external(zoom_level: f64, radius_meters: f64) -> bool {
    zoom_level > EXTERNAL_FETCH_MIN_ZOOM && radius_meters <= MAX_NEARBY_RADIUS_M
}

struct ControllerInner {
    catalog: Arc<dyn CatalogApi>,
    provider: Arc<dyn PlaceProvider>,
    aggregator: RatingAggregator,
    settings: ControllerSettings,
    debouncer: Debouncer,
    sequencer: RequestSequencer,
    state: watch::Sender<Arc<MapSnapshot>>,
}

/// Viewport state machine
/// DOCUMENTATION: Cheap to clone; clones share state. Transitions are the only
/// writers; the rendering layer reads snapshots. Must be driven from a tokio runtime.
#[derive(Clone)]
pub struct ViewportController {
    inner: Arc<ControllerInner>,
}

impl ViewportController {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        provider: Arc<dyn PlaceProvider>,
        settings: ControllerSettings,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(MapSnapshot::default()));

        Self {
            inner: Arc::new(ControllerInner {
                aggregator: RatingAggregator::new(catalog.clone(), provider.clone()),
                catalog,
                provider,
                settings,
                debouncer: Debouncer::new(),
                sequencer: RequestSequencer::new(),
                state,
            }),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<MapSnapshot> {
        self.inner.state.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<MapSnapshot>> {
        self.inner.state.subscribe()
    }

    pub fn visible_markers(&self) -> MarkerSet {
        self.snapshot().visible_markers()
    }

    /// Cancel pending timers (session teardown)
    pub fn shutdown(&self) {
        self.inner.debouncer.cancel_all();
    }

    /// Apply a transition and publish the result
    fn update(&self, transition: impl FnOnce(&mut MapSnapshot)) {
        self.inner.state.send_modify(|current| {
            let snapshot = Arc::make_mut(current);
            transition(snapshot);
            snapshot.heal_selection();
        });
    }

    /// Filter/mode change
    /// DOCUMENTATION: Cancels a pending region timer, fetches the catalog, enriches
    /// ratings, then publishes Ready. On failure publishes Error and reverts to Ready
    /// with the last-known-good places if there are any.
    pub async fn set_mode(&self, mode: CatalogMode) -> Arc<MapSnapshot> {
        let inner = &self.inner;
        // The text search timer is independent and keeps running
        inner.debouncer.cancel(DebounceChannel::RegionFetch);

        let seq = inner.sequencer.issue(FetchChannel::Catalog);
        self.update(|s| {
            s.mode = mode.clone();
            s.notice = None;
            s.fetching_internal = true;
            s.settle_phase();
        });

        log::info!("Catalog mode changed to {:?}", mode);

        let result = match self.fetch_catalog(&mode).await {
            Ok(places) => Ok(inner.aggregator.enrich(places).await),
            Err(e) => Err(e),
        };

        if !inner.sequencer.is_latest(FetchChannel::Catalog, seq) {
            log::debug!("Discarding stale catalog response #{}", seq);
            return self.snapshot();
        }

        match result {
            Ok(places) => {
                log::info!("Catalog ready with {} places", places.len());
                self.update(|s| {
                    s.places = places;
                    s.has_loaded = true;
                    s.fetching_internal = false;
                    s.settle_phase();
                });
            }
            Err(e) => {
                log::error!("Catalog fetch failed: {}", e);
                let message = e.user_message();
                self.update(|s| {
                    s.fetching_internal = false;
                    s.phase = ViewPhase::Error(message.clone());
                    s.notice = Some(message);
                });
                // Revert to Ready with last-known-good places when there are any
                self.update(|s| s.settle_phase());
            }
        }

        self.snapshot()
    }

    async fn fetch_catalog(&self, mode: &CatalogMode) -> Result<Vec<Place>, PlacesError> {
        let catalog = &self.inner.catalog;
        match mode {
            CatalogMode::Popular => catalog.fetch_by_filter(CatalogFilter::Popular).await,
            CatalogMode::Recent => catalog.fetch_by_filter(CatalogFilter::Recent).await,
            CatalogMode::Historical => catalog.fetch_by_filter(CatalogFilter::Historical).await,
            CatalogMode::Nearby { center } => {
                if !center.is_valid() {
                    return Err(PlacesError::InvalidInput(
                        "Nearby mode needs a valid location".to_string(),
                    ));
                }
                catalog
                    .fetch_nearby(*center, self.inner.settings.nearby_catalog_radius_m)
                    .await
            }
            CatalogMode::Text { search } => catalog.fetch_by_text_query(search).await,
        }
    }

    /// Viewport change
    /// DOCUMENTATION: Zoom and radius are published immediately; the provider call
    /// is debounced and only the last region of a burst is fetched
    pub fn on_region_change(&self, viewport: Viewport) -> Result<RegionUpdate, PlacesError> {
        if !viewport.is_valid() {
            log::warn!("Ignoring invalid viewport {:?}", viewport);
            return Err(PlacesError::InvalidInput(
                "Viewport deltas must be positive and finite".to_string(),
            ));
        }

        let settings = &self.inner.settings;
        let zoom_level = GeoMath::zoom_level(settings.viewport_width_px, viewport.longitude_delta);
        let radius_meters = GeoMath::search_radius_meters(viewport.latitude_delta);

        self.update(|s| {
            s.viewport = Some(viewport);
            s.zoom_level = zoom_level;
            s.radius_meters = Some(radius_meters);
        });

        let controller = self.clone();
        self.inner.debouncer.schedule_debounced(
            DebounceChannel::RegionFetch,
            settings.region_debounce,
            async move {
                controller
                    .run_region_fetch(viewport, zoom_level, radius_meters)
                    .await;
            },
        );

        Ok(RegionUpdate {
            zoom_level,
            radius_meters,
            will_fetch_external: should_fetch_external(zoom_level, radius_meters),
        })
    }

    async fn run_region_fetch(&self, viewport: Viewport, zoom_level: f64, radius_meters: f64) {
        let inner = &self.inner;

        if !should_fetch_external(zoom_level, radius_meters) {
            log::debug!(
                "Skipping provider fetch (zoom {:.2}, radius {:.0} m), clearing provider markers",
                zoom_level,
                radius_meters
            );
            inner.sequencer.invalidate(FetchChannel::Region);
            self.update(|s| {
                s.nearby_places.clear();
                s.fetching_external = false;
                s.settle_phase();
            });
            return;
        }

        let seq = inner.sequencer.issue(FetchChannel::Region);
        self.update(|s| {
            s.fetching_external = true;
            s.settle_phase();
        });

        let result = inner
            .provider
            .search_nearby(viewport.center(), radius_meters, &inner.settings.nearby_categories)
            .await;

        if !inner.sequencer.is_latest(FetchChannel::Region, seq) {
            log::debug!("Discarding stale nearby response #{}", seq);
            return;
        }

        self.update(|s| {
            s.fetching_external = false;
            match result {
                Ok(places) => {
                    log::debug!("Provider returned {} nearby places", places.len());
                    s.nearby_places = places;
                }
                Err(e) => {
                    log::warn!("Provider nearby search failed, withholding markers: {}", e);
                    s.nearby_places.clear();
                    s.notice = Some(e.user_message());
                }
            }
            s.settle_phase();
        });
    }

    /// Free-text query change
    /// DOCUMENTATION: Debounced provider text search into a separate results list.
    /// An empty query clears the results without a network call.
    pub fn on_query_change(&self, query: SearchQuery) {
        let inner = &self.inner;

        if query.is_empty() {
            inner.debouncer.cancel(DebounceChannel::TextSearch);
            inner.sequencer.invalidate(FetchChannel::TextSearch);
            self.update(|s| {
                s.query = query;
                s.search_results.clear();
                s.is_searching = false;
            });
            return;
        }

        self.update(|s| s.query = query.clone());

        let controller = self.clone();
        inner.debouncer.schedule_debounced(
            DebounceChannel::TextSearch,
            inner.settings.text_search_debounce,
            async move {
                controller.run_text_search(query).await;
            },
        );
    }

    async fn run_text_search(&self, query: SearchQuery) {
        let inner = &self.inner;
        let seq = inner.sequencer.issue(FetchChannel::TextSearch);
        self.update(|s| s.is_searching = true);

        let result = inner.provider.search_by_text(query.trimmed()).await;

        if !inner.sequencer.is_latest(FetchChannel::TextSearch, seq) {
            log::debug!("Discarding stale text search response #{}", seq);
            return;
        }

        self.update(|s| {
            s.is_searching = false;
            match result {
                Ok(places) => {
                    s.search_results = places
                        .into_iter()
                        .filter(|p| query.accepts_rating(p.rating_or_zero()))
                        .collect();
                    log::debug!(
                        "Text search '{}' produced {} results",
                        query.trimmed(),
                        s.search_results.len()
                    );
                }
                Err(e) => {
                    log::error!("Provider text search failed: {}", e);
                    s.search_results.clear();
                    s.notice = Some(e.user_message());
                }
            }
        });
    }

    /// Marker or background press from the mapping layer
    pub fn on_press(&self, press: MapPress) -> Selection {
        let mut chosen = Selection::None;
        self.update(|s| {
            let next = {
                let pinned: &[ExternalPlace] = match &s.focused_result {
                    Some(place) => std::slice::from_ref(place),
                    None => &[],
                };
                s.selection.on_press(
                    &press,
                    &s.places,
                    &[s.nearby_places.as_slice(), s.search_results.as_slice(), pinned],
                )
            };
            s.selection = next.clone();
            chosen = next;
        });
        chosen
    }

    /// The owning screen went to the background
    pub fn on_screen_background(&self) {
        self.update(|s| s.selection = Selection::None);
    }

    /// Walking-directions link to the selected place
    pub fn directions(&self, platform: Platform) -> Result<String, PlacesError> {
        let coordinate = match &self.snapshot().selection {
            Selection::None => {
                return Err(PlacesError::InvariantViolation(
                    "No place is selected".to_string(),
                ))
            }
            Selection::SelectedInternal(place) => place.coordinate(),
            Selection::SelectedExternal(place) => Some(place.point()),
        };

        GeoMath::directions_url(coordinate, platform)
    }

    /// Pick a text search result
    /// DOCUMENTATION: Clears the query and results, selects the place and returns the
    /// viewport the map should move to
    pub fn select_search_result(&self, provider_id: &str) -> Result<Viewport, PlacesError> {
        let snapshot = self.snapshot();
        let Some(place) = snapshot
            .search_results
            .iter()
            .find(|p| p.provider_id == provider_id)
            .cloned()
        else {
            self.update(|s| s.selection = Selection::None);
            return Err(PlacesError::InvariantViolation(format!(
                "Search result {} is no longer available",
                provider_id
            )));
        };

        let inner = &self.inner;
        inner.debouncer.cancel(DebounceChannel::TextSearch);
        inner.sequencer.invalidate(FetchChannel::TextSearch);

        let focus = Viewport::focused_on(place.latitude, place.longitude);
        self.update(|s| {
            s.query = SearchQuery::default();
            s.search_results.clear();
            s.is_searching = false;
            s.focused_result = Some(place.clone());
            s.selection = Selection::SelectedExternal(place);
        });

        Ok(focus)
    }

    /// Submit a 1-5 rating and refresh that place's average
    pub async fn rate_place(&self, user_id: &str, request: RateRequest) -> Result<f64, PlacesError> {
        request.validate()?;

        let snapshot = self.snapshot();
        let Some(previous) = snapshot
            .places
            .iter()
            .find(|p| p.id == request.place_id)
            .map(|p| p.average_rating)
        else {
            return Err(PlacesError::NotFound(format!("place {}", request.place_id)));
        };

        let catalog = &self.inner.catalog;
        catalog
            .submit_rating(
                &request.place_id,
                user_id,
                &RatingSubmission {
                    value: request.value,
                },
            )
            .await?;

        let average = match catalog.fetch_average_rating(&request.place_id).await {
            Ok(average) if average.is_finite() => average,
            Ok(_) => previous,
            Err(e) => {
                log::warn!("Could not refresh rating for {}: {}", request.place_id, e);
                previous
            }
        };

        self.update(|s| {
            if let Some(place) = s.places.iter_mut().find(|p| p.id == request.place_id) {
                place.average_rating = average;
            }
        });

        Ok(average)
    }
}
