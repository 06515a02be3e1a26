/// WMO weather code → display glyph, by numeric range.
pub fn emoji(code: i32) -> &'static str {
    match code {
        0 => "☀️",
        1 | 2 => "🌤️",
        3 => "☁️",
        45..=48 => "🌫️",
        51..=57 | 61..=67 | 80..=82 => "🌧️",
        71..=77 => "❄️",
        95..=i32::MAX => "⛈️",
        _ => "🔆",
    }
}

pub fn summary_en(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 | 2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 | 56 | 57 => "Drizzle",
        61 | 63 | 65 | 66 | 67 => "Rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Unknown conditions",
    }
}
