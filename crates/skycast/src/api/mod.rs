use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::model::{ForecastPayload, Place, UnitPreferences};

pub mod open_meteo;

/// Number of candidate places fetched for the suggestion dropdown.
pub const SUGGESTION_COUNT: u8 = 6;

/// The two remote operations behind the whole application. Both are
/// idempotent and side-effect-free beyond the network call; there is no
/// client-side caching layer.
pub trait WeatherApi: Send + Sync {
    /// Resolve free text to up to `max_results` candidate places in the
    /// service's own relevance order. An empty vec means "no match" and
    /// is not an error.
    fn resolve_place(&self, query: &str, max_results: u8) -> Result<Vec<Place>, ApiError>;

    /// Fetch a 7-day forecast at hourly and daily granularity, localized
    /// to the location's timezone, with values in the requested units.
    fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        units: UnitPreferences,
    ) -> Result<ForecastPayload, ApiError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    geocode_url: String,
    forecast_url: String,
}

impl HttpApi {
    pub fn new(config: &RuntimeConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            geocode_url: config.geocode_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }
}

impl WeatherApi for HttpApi {
    fn resolve_place(&self, query: &str, max_results: u8) -> Result<Vec<Place>, ApiError> {
        open_meteo::fetch_places(&self.client, &self.geocode_url, query, max_results)
    }

    fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        units: UnitPreferences,
    ) -> Result<ForecastPayload, ApiError> {
        open_meteo::fetch_forecast(&self.client, &self.forecast_url, lat, lon, units)
    }
}
