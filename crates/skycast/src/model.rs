use serde::Deserialize;
use thiserror::Error;

/// A geocoded place. Immutable once obtained: it serves as both the
/// display label and the coordinate pair for forecast lookups.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    /// "Name, Admin1, Country", skipping parts the geocoder left out.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [self.admin1.as_deref(), self.country.as_deref()] {
            if let Some(part) = part.map(str::trim).filter(|part| !part.is_empty()) {
                label.push_str(", ");
                label.push_str(part);
            }
        }
        label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn api_value(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            Self::Celsius => "Celsius (°C)",
            Self::Fahrenheit => "Fahrenheit (°F)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSpeedUnit {
    Kmh,
    Mph,
}

impl WindSpeedUnit {
    pub fn api_value(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Mph => "mph",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Mph => "mph",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Mph => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationUnit {
    Millimeters,
    Inches,
}

impl PrecipitationUnit {
    pub fn api_value(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "inch",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "in",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            Self::Millimeters => "Millimeters (mm)",
            Self::Inches => "Inches (in)",
        }
    }
}

/// The user's unit triple. Exactly one option per category by
/// construction; the forecast endpoint receives the `api_value`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
}

impl UnitPreferences {
    pub const fn metric() -> Self {
        Self {
            temperature: TemperatureUnit::Celsius,
            wind_speed: WindSpeedUnit::Kmh,
            precipitation: PrecipitationUnit::Millimeters,
        }
    }

    pub const fn imperial() -> Self {
        Self {
            temperature: TemperatureUnit::Fahrenheit,
            wind_speed: WindSpeedUnit::Mph,
            precipitation: PrecipitationUnit::Inches,
        }
    }
}

impl Default for UnitPreferences {
    fn default() -> Self {
        Self::metric()
    }
}

/// Parallel hourly series indexed by `time`. Cells are optional because
/// the service omits values it cannot produce; rendering substitutes a
/// placeholder rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub windspeed: Option<f64>,
}

/// One forecast response: 7 days at hourly and daily granularity,
/// localized to the location's timezone. Held only for the duration of a
/// render cycle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
    #[serde(default)]
    pub hourly: HourlySeries,
    #[serde(default)]
    pub daily: DailySeries,
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), ValidationError> {
    if !((-90.0)..=90.0).contains(&lat) {
        return Err(ValidationError::InvalidLatitude(lat));
    }
    if !((-180.0)..=180.0).contains(&lon) {
        return Err(ValidationError::InvalidLongitude(lon));
    }
    Ok(())
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}
