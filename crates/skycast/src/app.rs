use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiError, SUGGESTION_COUNT, WeatherApi};
use crate::config::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PLACE_LABEL};
use crate::model::{ForecastPayload, Place};
use crate::search::{Effect, GEOCODE_RESULT_COUNT, Orchestrator};
use crate::suggest::{SuggestController, SuggestRequest};
use crate::units::UnitsMenu;

/// Completion of a worker-thread network call, tagged with the request
/// generation it was dispatched under.
#[derive(Debug)]
pub enum Msg {
    Suggestions {
        generation: u64,
        result: Result<Vec<Place>, ApiError>,
    },
    Places {
        generation: u64,
        result: Result<Vec<Place>, ApiError>,
    },
    Forecast {
        generation: u64,
        result: Result<ForecastPayload, ApiError>,
    },
}

/// What to load before the user has typed anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    Coordinates { lat: f64, lon: f64, label: String },
    Query(String),
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::Coordinates {
            lat: DEFAULT_LATITUDE,
            lon: DEFAULT_LONGITUDE,
            label: DEFAULT_PLACE_LABEL.to_string(),
        }
    }
}

/// Event-loop shell around the pure state machines: routes key events
/// and worker completions, and spawns one short-lived thread per
/// network request. All state transitions happen on the loop thread.
pub struct App {
    api: Arc<dyn WeatherApi>,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    input: String,
    suggest: SuggestController,
    orchestrator: Orchestrator,
    units_menu: UnitsMenu,
    should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn WeatherApi>, bootstrap: Bootstrap) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            api,
            tx,
            rx,
            input: String::new(),
            suggest: SuggestController::new(),
            orchestrator: Orchestrator::new(),
            units_menu: UnitsMenu::new(),
            should_quit: false,
        };
        app.bootstrap(bootstrap);
        app
    }

    fn bootstrap(&mut self, bootstrap: Bootstrap) {
        let units = self.units_menu.selected_units();
        match bootstrap {
            Bootstrap::Coordinates { lat, lon, label } => {
                self.input = label.clone();
                let effect = self
                    .orchestrator
                    .search_by_coordinates(lat, lon, &label, units);
                self.dispatch(effect);
            }
            Bootstrap::Query(query) => {
                self.input = query.clone();
                if let Some(effect) = self.orchestrator.search_by_query(&query, units) {
                    self.suggest.show_searching(query);
                    self.dispatch(effect);
                }
            }
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggest(&self) -> &SuggestController {
        &self.suggest
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn units_menu(&self) -> &UnitsMenu {
        &self.units_menu
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// One scheduler turn: drain finished network calls, then fire the
    /// debounce timer if it is due.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_msg(msg);
        }

        if let Some(request) = self.suggest.poll(now) {
            self.dispatch_suggestions(request);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // A visible overlay blocks everything behind it; Retry is its
        // single affordance.
        if self.orchestrator.overlay().is_some() {
            match key.code {
                KeyCode::Enter => {
                    let units = self.units_menu.selected_units();
                    if let Some(effect) = self.orchestrator.retry(units) {
                        self.dispatch(effect);
                    }
                }
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if self.units_menu.is_open() {
            match key.code {
                KeyCode::Up => self.units_menu.move_cursor(-1),
                KeyCode::Down => self.units_menu.move_cursor(1),
                KeyCode::Enter => {
                    let units = self.units_menu.apply_highlighted();
                    if let Some(effect) = self.orchestrator.units_changed(units) {
                        self.dispatch(effect);
                    }
                }
                KeyCode::Esc | KeyCode::Tab => self.units_menu.close(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(ch) => {
                self.input.push(ch);
                self.suggest.input_changed(&self.input, now);
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.suggest.input_changed(&self.input, now);
            }
            KeyCode::Down => self.suggest.move_cursor(1),
            KeyCode::Up => self.suggest.move_cursor(-1),
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => self.suggest.dismiss(),
            KeyCode::Tab => self.units_menu.toggle(),
            _ => {}
        }
    }

    /// Enter in the search box: a highlighted suggestion wins and goes
    /// straight to coordinates; otherwise the typed text is geocoded.
    fn submit(&mut self) {
        let units = self.units_menu.selected_units();

        if let Some(place) = self.suggest.highlighted().cloned() {
            let label = place.label();
            self.input = label.clone();
            self.suggest.dismiss();
            let effect =
                self.orchestrator
                    .search_by_coordinates(place.latitude, place.longitude, &label, units);
            self.dispatch(effect);
            return;
        }

        let query = self.input.trim().to_string();
        if let Some(effect) = self.orchestrator.search_by_query(&query, units) {
            self.suggest.show_searching(query);
            self.dispatch(effect);
        }
    }

    fn handle_msg(&mut self, msg: Msg) {
        match msg {
            Msg::Suggestions { generation, result } => {
                self.suggest.on_response(generation, result);
            }
            Msg::Places { generation, result } => {
                if let Some(effect) = self.orchestrator.on_places_resolved(generation, result) {
                    self.dispatch(effect);
                } else if !self.orchestrator.is_loading() {
                    self.suggest.dismiss();
                }
            }
            Msg::Forecast { generation, result } => {
                self.orchestrator.on_forecast(generation, result);
                if !self.orchestrator.is_loading() {
                    self.suggest.dismiss();
                }
            }
        }
    }

    fn dispatch(&self, effect: Effect) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        match effect {
            Effect::Geocode { query, generation } => {
                thread::spawn(move || {
                    let result = api.resolve_place(&query, GEOCODE_RESULT_COUNT);
                    let _ = tx.send(Msg::Places { generation, result });
                });
            }
            Effect::Forecast {
                lat,
                lon,
                units,
                generation,
            } => {
                thread::spawn(move || {
                    let result = api.fetch_forecast(lat, lon, units);
                    let _ = tx.send(Msg::Forecast { generation, result });
                });
            }
        }
    }

    fn dispatch_suggestions(&self, request: SuggestRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = api.resolve_place(&request.query, SUGGESTION_COUNT);
            let _ = tx.send(Msg::Suggestions {
                generation: request.generation,
                result,
            });
        });
    }

    /// Test hook: block until the next worker completion arrives and
    /// route it, instead of busy-polling `tick`.
    #[cfg(test)]
    pub(crate) fn pump_one(&mut self) {
        let msg = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("worker completion");
        self.handle_msg(msg);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::model::{HourlySeries, UnitPreferences};
    use crate::suggest::DEBOUNCE;

    struct FakeApi {
        places: Result<Vec<Place>, ApiError>,
        forecast: Result<ForecastPayload, ApiError>,
        geocode_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
    }

    impl FakeApi {
        fn ok() -> Self {
            Self {
                places: Ok(vec![Place {
                    name: "Natal".to_string(),
                    admin1: Some("Rio Grande do Norte".to_string()),
                    country: Some("Brazil".to_string()),
                    latitude: -5.79,
                    longitude: -35.21,
                }]),
                forecast: Ok(ForecastPayload {
                    hourly: HourlySeries {
                        time: vec!["2026-08-04T15:00".to_string()],
                        temperature_2m: vec![Some(27.3)],
                        ..HourlySeries::default()
                    },
                    ..ForecastPayload::default()
                }),
                geocode_calls: AtomicUsize::new(0),
                forecast_calls: AtomicUsize::new(0),
            }
        }
    }

    impl WeatherApi for FakeApi {
        fn resolve_place(&self, _query: &str, _max_results: u8) -> Result<Vec<Place>, ApiError> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            self.places.clone()
        }

        fn fetch_forecast(
            &self,
            _lat: f64,
            _lon: f64,
            _units: UnitPreferences,
        ) -> Result<ForecastPayload, ApiError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            self.forecast.clone()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_bootstrap_fetches_coordinates_without_geocoding() {
        let api = Arc::new(FakeApi::ok());
        let mut app = App::new(Arc::clone(&api) as Arc<dyn WeatherApi>, Bootstrap::default());

        app.pump_one();

        assert_eq!(api.geocode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.forecast_calls.load(Ordering::SeqCst), 1);
        let view = app.orchestrator().view().expect("view");
        assert_eq!(view.place_label, "Natal, Rio Grande do Norte, Brazil");
        assert_eq!(app.input(), "Natal, Rio Grande do Norte, Brazil");
    }

    #[test]
    fn typing_then_debounce_fires_one_suggestion_request() {
        let api = Arc::new(FakeApi::ok());
        let mut app = App::new(Arc::clone(&api) as Arc<dyn WeatherApi>, Bootstrap::default());
        app.pump_one();
        let calls_after_bootstrap = api.geocode_calls.load(Ordering::SeqCst);

        app.input.clear();
        let start = Instant::now();
        app.handle_key(key(KeyCode::Char('N')), start);
        app.handle_key(key(KeyCode::Char('a')), start + Duration::from_millis(80));
        app.handle_key(key(KeyCode::Char('t')), start + Duration::from_millis(160));

        app.tick(start + Duration::from_millis(200));
        assert_eq!(api.geocode_calls.load(Ordering::SeqCst), calls_after_bootstrap);

        app.tick(start + Duration::from_millis(160) + DEBOUNCE);
        app.pump_one();
        assert_eq!(
            api.geocode_calls.load(Ordering::SeqCst),
            calls_after_bootstrap + 1
        );
        assert!(app.suggest().is_visible());
        assert_eq!(app.suggest().places().len(), 1);
    }

    #[test]
    fn selecting_a_suggestion_searches_by_coordinates() {
        let api = Arc::new(FakeApi::ok());
        let mut app = App::new(Arc::clone(&api) as Arc<dyn WeatherApi>, Bootstrap::default());
        app.pump_one();

        app.input.clear();
        let start = Instant::now();
        app.handle_key(key(KeyCode::Char('N')), start);
        app.tick(start + DEBOUNCE);
        app.pump_one();

        app.handle_key(key(KeyCode::Down), start + DEBOUNCE);
        let geocode_calls = api.geocode_calls.load(Ordering::SeqCst);
        app.handle_key(key(KeyCode::Enter), start + DEBOUNCE);
        app.pump_one();

        // Selection goes straight to the forecast; no extra geocode.
        assert_eq!(api.geocode_calls.load(Ordering::SeqCst), geocode_calls);
        assert_eq!(api.forecast_calls.load(Ordering::SeqCst), 2);
        assert_eq!(app.input(), "Natal, Rio Grande do Norte, Brazil");
        assert!(!app.suggest().is_visible());
    }

    #[test]
    fn unit_toggle_after_load_refetches_cached_coordinates() {
        let api = Arc::new(FakeApi::ok());
        let mut app = App::new(Arc::clone(&api) as Arc<dyn WeatherApi>, Bootstrap::default());
        app.pump_one();

        let now = Instant::now();
        app.handle_key(key(KeyCode::Tab), now);
        assert!(app.units_menu().is_open());
        app.handle_key(key(KeyCode::Enter), now); // switch row → imperial
        app.pump_one();

        assert_eq!(api.geocode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.forecast_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            app.units_menu().selected_units(),
            UnitPreferences::imperial()
        );
    }

    #[test]
    fn forecast_failure_shows_overlay_and_enter_retries() {
        let api = Arc::new(FakeApi {
            forecast: Err(ApiError::Transport("timeout".to_string())),
            ..FakeApi::ok()
        });
        let mut app = App::new(Arc::clone(&api) as Arc<dyn WeatherApi>, Bootstrap::default());
        app.pump_one();

        assert!(app.orchestrator().overlay().is_some());

        app.handle_key(key(KeyCode::Enter), Instant::now());
        app.pump_one();
        assert_eq!(api.forecast_calls.load(Ordering::SeqCst), 2);
        assert!(app.orchestrator().overlay().is_some(), "retry failed again");
    }

    #[test]
    fn query_bootstrap_geocodes_then_fetches() {
        let api = Arc::new(FakeApi::ok());
        let mut app = App::new(
            Arc::clone(&api) as Arc<dyn WeatherApi>,
            Bootstrap::Query("Natal".to_string()),
        );
        app.pump_one(); // geocode
        app.pump_one(); // forecast

        assert_eq!(api.geocode_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.forecast_calls.load(Ordering::SeqCst), 1);
        let view = app.orchestrator().view().expect("view");
        assert_eq!(view.place_label, "Natal, Rio Grande do Norte, Brazil");
    }
}
