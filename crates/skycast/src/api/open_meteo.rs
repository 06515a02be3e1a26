use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ForecastPayload, Place, UnitPreferences};

use super::ApiError;

const FORECAST_DAYS: u8 = 7;
const HOURLY_FIELDS: &str =
    "temperature_2m,apparent_temperature,relative_humidity_2m,precipitation,weathercode,wind_speed_10m";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Debug, Serialize)]
struct GeocodeQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    hourly: &'a str,
    daily: &'a str,
    timezone: &'a str,
    temperature_unit: &'a str,
    wind_speed_unit: &'a str,
    precipitation_unit: &'a str,
    forecast_days: u8,
}

pub fn fetch_places(
    client: &Client,
    endpoint: &str,
    query: &str,
    max_results: u8,
) -> Result<Vec<Place>, ApiError> {
    let params = GeocodeQuery {
        name: query,
        count: max_results,
        language: "en",
        format: "json",
    };

    let body = execute_request(client.get(endpoint).query(&params))?;
    parse_place_response(&body)
}

pub fn fetch_forecast(
    client: &Client,
    endpoint: &str,
    lat: f64,
    lon: f64,
    units: UnitPreferences,
) -> Result<ForecastPayload, ApiError> {
    let params = ForecastQuery {
        latitude: lat,
        longitude: lon,
        hourly: HOURLY_FIELDS,
        daily: DAILY_FIELDS,
        timezone: "auto",
        temperature_unit: units.temperature.api_value(),
        wind_speed_unit: units.wind_speed.api_value(),
        precipitation_unit: units.precipitation.api_value(),
        forecast_days: FORECAST_DAYS,
    };

    let body = execute_request(client.get(endpoint).query(&params))?;
    parse_forecast_response(&body)
}

fn execute_request(request: RequestBuilder) -> Result<String, ApiError> {
    let response = request
        .send()
        .map_err(|error| ApiError::Transport(error.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|error| ApiError::Transport(error.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = extract_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

fn parse_place_response(body: &str) -> Result<Vec<Place>, ApiError> {
    let payload: GeocodeResponse = serde_json::from_str(body)
        .map_err(|error| ApiError::InvalidResponse(format!("geocode payload: {error}")))?;

    // An absent `results` key is the service's way of saying "no match".
    Ok(payload.results)
}

fn parse_forecast_response(body: &str) -> Result<ForecastPayload, ApiError> {
    serde_json::from_str(body)
        .map_err(|error| ApiError::InvalidResponse(format!("forecast payload: {error}")))
}

fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|json| {
            for key in ["reason", "message", "error", "detail", "description"] {
                if let Some(value) = json.get(key).and_then(Value::as_str) {
                    let message = value.trim();
                    if !message.is_empty() {
                        return Some(message.to_string());
                    }
                }
            }
            None
        });

    from_json.or_else(|| Some(trimmed.to_string()))
}
