use crate::format;
use crate::model::{ForecastPayload, UnitPreferences};
use crate::weather_code;

pub const HOURLY_STRIP_LEN: usize = 12;
pub const DAILY_CARD_COUNT: usize = 5;

/// Shown wherever the payload lacks a value. Rendering never fails on
/// absent data.
pub const PLACEHOLDER: &str = "—";

const FALLBACK_ICON: &str = "🔆";

/// Everything the UI needs to paint a forecast, as display strings. The
/// terminal adapter translates this 1:1 into widgets and holds no logic
/// of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub place_label: String,
    pub date_line: String,
    pub temperature: String,
    pub icon: String,
    pub condition: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub precipitation: String,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEntry {
    pub time: String,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyCard {
    pub weekday: String,
    pub icon: String,
    pub temps: String,
}

/// Pure function of (place label, payload, units) → display model.
pub fn build_render_model(
    place_label: &str,
    payload: &ForecastPayload,
    units: UnitPreferences,
) -> RenderModel {
    let hourly = &payload.hourly;
    let current = payload.current_weather.as_ref();

    if [
        hourly.temperature_2m.len(),
        hourly.apparent_temperature.len(),
        hourly.relative_humidity_2m.len(),
        hourly.precipitation.len(),
        hourly.weathercode.len(),
        hourly.wind_speed_10m.len(),
    ]
    .iter()
    .any(|len| *len != hourly.time.len())
    {
        tracing::debug!("ragged hourly series; missing cells render as placeholders");
    }

    let current_time = current
        .and_then(|block| block.time.as_deref())
        .or_else(|| hourly.time.first().map(String::as_str));

    // Locate the reported current timestamp in the hourly series; fall
    // back to index 0 when it is absent.
    let index = current_time
        .and_then(|time| hourly.time.iter().position(|entry| entry == time))
        .unwrap_or(0);

    let temperature = current
        .and_then(|block| block.temperature)
        .or_else(|| cell(&hourly.temperature_2m, index));
    let feels_like = cell(&hourly.apparent_temperature, index);
    let humidity = cell(&hourly.relative_humidity_2m, index);
    let precipitation = cell(&hourly.precipitation, index);
    let wind = cell(&hourly.wind_speed_10m, index)
        .or_else(|| current.and_then(|block| block.windspeed));
    let code = hourly.weathercode.get(index).copied().flatten();

    RenderModel {
        place_label: place_label.to_string(),
        date_line: current_time
            .map(format::readable_date)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        temperature: degrees(temperature),
        icon: code.map(weather_code::emoji).unwrap_or(FALLBACK_ICON).to_string(),
        condition: code
            .map(weather_code::summary_en)
            .unwrap_or(PLACEHOLDER)
            .to_string(),
        feels_like: degrees(feels_like),
        humidity: humidity
            .map(|value| format!("{}%", value.round() as i64))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        wind: wind
            .map(|value| {
                format!(
                    "{} {}",
                    value.round() as i64,
                    units.wind_speed.display_label()
                )
            })
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        precipitation: precipitation
            .map(|value| format!("{value:.1} {}", units.precipitation.display_label()))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        hourly: build_hourly_strip(payload),
        daily: build_daily_cards(payload),
    }
}

fn build_hourly_strip(payload: &ForecastPayload) -> Vec<HourlyEntry> {
    let hourly = &payload.hourly;
    hourly
        .time
        .iter()
        .take(HOURLY_STRIP_LEN)
        .enumerate()
        .map(|(index, time)| HourlyEntry {
            time: format::hour_label(time),
            temperature: degrees(cell(&hourly.temperature_2m, index)),
        })
        .collect()
}

fn build_daily_cards(payload: &ForecastPayload) -> Vec<DailyCard> {
    let daily = &payload.daily;
    daily
        .time
        .iter()
        .take(DAILY_CARD_COUNT)
        .enumerate()
        .map(|(index, date)| {
            let code = daily.weathercode.get(index).copied().flatten();
            DailyCard {
                weekday: format::short_weekday(date),
                icon: code.map(weather_code::emoji).unwrap_or(FALLBACK_ICON).to_string(),
                temps: format!(
                    "{} / {}",
                    bound(cell(&daily.temperature_2m_max, index)),
                    bound(cell(&daily.temperature_2m_min, index)),
                ),
            }
        })
        .collect()
}

fn cell(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

fn degrees(value: Option<f64>) -> String {
    value
        .map(|value| format!("{}°", value.round() as i64))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn bound(value: Option<f64>) -> String {
    value
        .map(|value| format!("{}°", value.round() as i64))
        .unwrap_or_else(|| "--°".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentWeather, DailySeries, HourlySeries};

    fn payload() -> ForecastPayload {
        ForecastPayload {
            timezone: Some("America/Fortaleza".to_string()),
            current_weather: Some(CurrentWeather {
                time: Some("2026-08-04T15:00".to_string()),
                temperature: Some(27.6),
                windspeed: Some(18.0),
            }),
            hourly: HourlySeries {
                time: vec![
                    "2026-08-04T14:00".to_string(),
                    "2026-08-04T15:00".to_string(),
                    "2026-08-04T16:00".to_string(),
                ],
                temperature_2m: vec![Some(26.8), Some(27.3), Some(27.0)],
                apparent_temperature: vec![Some(29.1), Some(30.4), None],
                relative_humidity_2m: vec![Some(70.0), Some(68.4), Some(69.0)],
                precipitation: vec![Some(0.0), Some(0.25), Some(0.1)],
                weathercode: vec![Some(2), Some(3), Some(61)],
                wind_speed_10m: vec![Some(16.4), Some(17.5), Some(19.0)],
            },
            daily: DailySeries {
                time: vec!["2026-08-04".to_string(), "2026-08-05".to_string()],
                weathercode: vec![Some(3), None],
                temperature_2m_max: vec![Some(28.4), Some(27.1)],
                temperature_2m_min: vec![Some(22.0), None],
                precipitation_sum: vec![Some(0.2), Some(4.8)],
            },
        }
    }

    #[test]
    fn current_values_come_from_the_reported_timestamp_index() {
        let model = build_render_model("Natal", &payload(), UnitPreferences::metric());

        // current_weather.temperature wins over the hourly cell.
        assert_eq!(model.temperature, "28°");
        assert_eq!(model.feels_like, "30°");
        assert_eq!(model.humidity, "68%");
        assert_eq!(model.wind, "18 km/h");
        assert_eq!(model.precipitation, "0.2 mm");
        assert_eq!(model.condition, "Overcast");
        assert_eq!(model.date_line, "Tuesday, Aug 4, 2026");
    }

    #[test]
    fn current_index_falls_back_to_zero_when_timestamp_missing() {
        let mut data = payload();
        data.current_weather = Some(CurrentWeather {
            time: Some("2026-08-04T23:00".to_string()),
            temperature: None,
            windspeed: None,
        });

        let model = build_render_model("Natal", &data, UnitPreferences::metric());
        assert_eq!(model.temperature, "27°");
        assert_eq!(model.feels_like, "29°");
    }

    #[test]
    fn absent_values_render_as_placeholder() {
        let model = build_render_model(
            "Nowhere",
            &ForecastPayload::default(),
            UnitPreferences::metric(),
        );

        assert_eq!(model.temperature, PLACEHOLDER);
        assert_eq!(model.feels_like, PLACEHOLDER);
        assert_eq!(model.humidity, PLACEHOLDER);
        assert_eq!(model.wind, PLACEHOLDER);
        assert_eq!(model.precipitation, PLACEHOLDER);
        assert_eq!(model.date_line, PLACEHOLDER);
        assert!(model.hourly.is_empty());
        assert!(model.daily.is_empty());
    }

    #[test]
    fn null_apparent_temperature_renders_placeholder() {
        let mut data = payload();
        data.hourly.apparent_temperature = vec![None, None, None];

        let model = build_render_model("Natal", &data, UnitPreferences::metric());
        assert_eq!(model.feels_like, PLACEHOLDER);
    }

    #[test]
    fn hourly_strip_is_capped_at_twelve_entries_in_order() {
        let mut data = payload();
        data.hourly.time = (0..20).map(|hour| format!("2026-08-04T{hour:02}:00")).collect();
        data.hourly.temperature_2m = (0..20).map(|hour| Some(f64::from(hour))).collect();

        let model = build_render_model("Natal", &data, UnitPreferences::metric());
        assert_eq!(model.hourly.len(), HOURLY_STRIP_LEN);
        assert_eq!(model.hourly[0].time, "12 AM");
        assert_eq!(model.hourly[11].time, "11 AM");
        assert_eq!(model.hourly[11].temperature, "11°");
    }

    #[test]
    fn daily_cards_cap_at_five_and_tolerate_gaps() {
        let mut data = payload();
        data.daily.time = (4..11).map(|day| format!("2026-08-{day:02}")).collect();
        data.daily.weathercode = vec![Some(0); 7];
        data.daily.temperature_2m_max = vec![Some(30.0); 7];
        data.daily.temperature_2m_min = vec![Some(21.0); 7];

        let model = build_render_model("Natal", &data, UnitPreferences::metric());
        assert_eq!(model.daily.len(), DAILY_CARD_COUNT);
        assert_eq!(model.daily[0].weekday, "Tue");
        assert_eq!(model.daily[0].icon, "☀️");
        assert_eq!(model.daily[0].temps, "30° / 21°");
    }

    #[test]
    fn daily_card_missing_bounds_use_dashes() {
        let model = build_render_model("Natal", &payload(), UnitPreferences::metric());
        assert_eq!(model.daily[1].temps, "27° / --°");
        assert_eq!(model.daily[1].icon, FALLBACK_ICON);
    }

    #[test]
    fn imperial_units_change_display_labels() {
        let model = build_render_model("Natal", &payload(), UnitPreferences::imperial());
        assert!(model.wind.ends_with("mph"));
        assert!(model.precipitation.ends_with("in"));
    }
}
