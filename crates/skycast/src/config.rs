use std::collections::HashMap;
use std::path::PathBuf;

pub const GEOCODE_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const HTTP_TIMEOUT_SECS: u64 = 10;

pub const GEOCODE_URL_ENV: &str = "SKYCAST_GEOCODE_URL";
pub const FORECAST_URL_ENV: &str = "SKYCAST_FORECAST_URL";
pub const HTTP_TIMEOUT_SECS_ENV: &str = "SKYCAST_HTTP_TIMEOUT_SECS";
pub const LOG_FILE_ENV: &str = "SKYCAST_LOG_FILE";

/// Bootstrap location used when no place is given on the command line.
pub const DEFAULT_PLACE_LABEL: &str = "Natal, Rio Grande do Norte, Brazil";
pub const DEFAULT_LATITUDE: f64 = -5.7945;
pub const DEFAULT_LONGITUDE: f64 = -35.211;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub geocode_url: String,
    pub forecast_url: String,
    pub http_timeout_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            geocode_url: resolve_url(&map, GEOCODE_URL_ENV, GEOCODE_ENDPOINT),
            forecast_url: resolve_url(&map, FORECAST_URL_ENV, FORECAST_ENDPOINT),
            http_timeout_secs: resolve_timeout_secs(&map),
            log_file: resolve_log_file(&map),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_pairs(Vec::<(String, String)>::new())
    }
}

fn resolve_url(env_map: &HashMap<String, String>, key: &str, default: &str) -> String {
    env_map
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn resolve_timeout_secs(env_map: &HashMap<String, String>) -> u64 {
    env_map
        .get(HTTP_TIMEOUT_SECS_ENV)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(HTTP_TIMEOUT_SECS)
}

fn resolve_log_file(env_map: &HashMap<String, String>) -> Option<PathBuf> {
    env_map
        .get(LOG_FILE_ENV)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_open_meteo_endpoints() {
        let config = RuntimeConfig::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(config.geocode_url, GEOCODE_ENDPOINT);
        assert_eq!(config.forecast_url, FORECAST_ENDPOINT);
        assert_eq!(config.http_timeout_secs, HTTP_TIMEOUT_SECS);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn config_supports_endpoint_overrides() {
        let config = RuntimeConfig::from_pairs(vec![
            (GEOCODE_URL_ENV, "http://127.0.0.1:9000/v1/search/"),
            (FORECAST_URL_ENV, "http://127.0.0.1:9000/v1/forecast"),
        ]);

        assert_eq!(config.geocode_url, "http://127.0.0.1:9000/v1/search");
        assert_eq!(config.forecast_url, "http://127.0.0.1:9000/v1/forecast");
    }

    #[test]
    fn config_supports_timeout_override() {
        let config = RuntimeConfig::from_pairs(vec![(HTTP_TIMEOUT_SECS_ENV, "3")]);
        assert_eq!(config.http_timeout_secs, 3);
    }

    #[test]
    fn config_falls_back_when_timeout_override_invalid() {
        let config = RuntimeConfig::from_pairs(vec![(HTTP_TIMEOUT_SECS_ENV, "zero")]);
        assert_eq!(config.http_timeout_secs, HTTP_TIMEOUT_SECS);

        let config = RuntimeConfig::from_pairs(vec![(HTTP_TIMEOUT_SECS_ENV, "0")]);
        assert_eq!(config.http_timeout_secs, HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn config_reads_log_file_path() {
        let config = RuntimeConfig::from_pairs(vec![(LOG_FILE_ENV, "/tmp/skycast.log")]);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/skycast.log")));
    }
}
