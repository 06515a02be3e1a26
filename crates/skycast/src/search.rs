use crate::api::ApiError;
use crate::config::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PLACE_LABEL};
use crate::model::{ForecastPayload, Place, UnitPreferences};
use crate::render::{self, RenderModel};
use crate::session::{Provenance, SearchSession};

/// Explicit searches resolve to a single best match.
pub const GEOCODE_RESULT_COUNT: u8 = 1;

const NO_RESULTS_TITLE: &str = "No results found.";
const NO_RESULTS_MESSAGE: &str =
    "Sorry. Your search had no results. Adjust the query and try again.";
const ERROR_TITLE: &str = "Something went wrong";
const ERROR_MESSAGE: &str =
    "We couldn't reach the weather service. Check your connection and retry.";

/// A network request the runtime must dispatch on behalf of the
/// orchestrator. The geocode→forecast pipeline is expressed through
/// these typed steps instead of nested callbacks; the generation stamp
/// identifies the logical search a completion belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Geocode {
        query: String,
        generation: u64,
    },
    Forecast {
        lat: f64,
        lon: f64,
        units: UnitPreferences,
        generation: u64,
    },
}

/// What pressing Retry replays, captured at failure time.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryAction {
    Query(String),
    Coordinates { lat: f64, lon: f64, label: String },
}

/// Full-screen notice for fatal errors and empty results — the only
/// user-visible error surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub title: String,
    pub message: String,
    pub retry: RetryAction,
}

/// Top-level search flow: resolves a query or coordinate pair, fetches
/// the forecast, and owns the Loading/Result/NoResults/Error UI phases.
/// Sole writer of the `SearchSession`.
#[derive(Debug, Default)]
pub struct Orchestrator {
    session: SearchSession,
    units: UnitPreferences,
    generation: u64,
    loading: bool,
    view: Option<RenderModel>,
    overlay: Option<Overlay>,
    refetch_armed: bool,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> Option<&RenderModel> {
        self.view.as_ref()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Resolve free text to one location, then fetch its forecast.
    /// Blank input is ignored, matching the search box behavior.
    pub fn search_by_query(&mut self, query: &str, units: UnitPreferences) -> Option<Effect> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.session.begin_query(query);
        self.begin(units);
        Some(Effect::Geocode {
            query: query.to_string(),
            generation: self.generation,
        })
    }

    /// Fetch directly by coordinates — suggestion selection, unit-change
    /// refetch, and the default-location bootstrap all land here and
    /// never geocode.
    pub fn search_by_coordinates(
        &mut self,
        lat: f64,
        lon: f64,
        label: &str,
        units: UnitPreferences,
    ) -> Effect {
        self.session.begin_coordinates(lat, lon, label);
        self.begin(units);
        Effect::Forecast {
            lat,
            lon,
            units,
            generation: self.generation,
        }
    }

    /// Geocode step completion. Returns the follow-up forecast fetch on
    /// a unique match; empty results and failures end the search in an
    /// overlay instead.
    pub fn on_places_resolved(
        &mut self,
        generation: u64,
        result: Result<Vec<Place>, ApiError>,
    ) -> Option<Effect> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale geocode discarded");
            return None;
        }

        let places = match result {
            Ok(places) => places,
            Err(error) => {
                tracing::warn!(%error, "geocoding failed");
                self.fail();
                return None;
            }
        };

        let Some(place) = places.into_iter().next() else {
            self.loading = false;
            self.overlay = Some(Overlay {
                title: NO_RESULTS_TITLE.to_string(),
                message: NO_RESULTS_MESSAGE.to_string(),
                retry: self.capture_retry(),
            });
            return None;
        };

        self.session.resolve_to(&place);
        Some(Effect::Forecast {
            lat: place.latitude,
            lon: place.longitude,
            units: self.units,
            generation: self.generation,
        })
    }

    /// Forecast step completion: the shared tail of both entry points.
    pub fn on_forecast(&mut self, generation: u64, result: Result<ForecastPayload, ApiError>) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale forecast discarded");
            return;
        }

        match result {
            Ok(payload) => {
                let label = self.session.place_label().unwrap_or_default().to_string();
                self.view = Some(render::build_render_model(&label, &payload, self.units));
                self.loading = false;
                self.overlay = None;
                // Unit changes may refetch from now on; the very first
                // load must settle before defaults can trigger one.
                self.refetch_armed = true;
            }
            Err(error) => {
                tracing::warn!(%error, "forecast fetch failed");
                self.fail();
            }
        }
    }

    /// Replay the operation captured in the dismissed overlay.
    pub fn retry(&mut self, units: UnitPreferences) -> Option<Effect> {
        let overlay = self.overlay.take()?;
        match overlay.retry {
            RetryAction::Query(query) => self.search_by_query(&query, units),
            RetryAction::Coordinates { lat, lon, label } => {
                Some(self.search_by_coordinates(lat, lon, &label, units))
            }
        }
    }

    /// Unit selection changed: refetch the last shown place in the new
    /// units. Inert until the first load succeeded.
    pub fn units_changed(&mut self, units: UnitPreferences) -> Option<Effect> {
        if !self.refetch_armed {
            return None;
        }

        if let Some((lat, lon, label)) = self.session.coordinates() {
            let label = label.to_string();
            return Some(self.search_by_coordinates(lat, lon, &label, units));
        }
        if let Some(Provenance::Query(query)) = self.session.provenance() {
            let query = query.clone();
            return self.search_by_query(&query, units);
        }
        None
    }

    fn begin(&mut self, units: UnitPreferences) {
        self.units = units;
        self.overlay = None;
        self.loading = true;
        self.generation += 1;
    }

    fn fail(&mut self) {
        self.loading = false;
        self.overlay = Some(Overlay {
            title: ERROR_TITLE.to_string(),
            message: ERROR_MESSAGE.to_string(),
            retry: self.capture_retry(),
        });
    }

    fn capture_retry(&self) -> RetryAction {
        match self.session.provenance() {
            Some(Provenance::Coordinates { lat, lon, label }) => RetryAction::Coordinates {
                lat: *lat,
                lon: *lon,
                label: label.clone(),
            },
            Some(Provenance::Query(query)) => RetryAction::Query(query.clone()),
            // Unreachable once a search ran; replay the bootstrap
            // location rather than leave retry dangling.
            None => RetryAction::Coordinates {
                lat: DEFAULT_LATITUDE,
                lon: DEFAULT_LONGITUDE,
                label: DEFAULT_PLACE_LABEL.to_string(),
            },
        }
    }
}
