use chrono::{NaiveDate, NaiveDateTime};

/// "2026-08-04T15:00" → "Tuesday, Aug 4, 2026". Unparseable input is
/// returned unchanged so a malformed timestamp degrades instead of
/// failing the whole panel.
pub fn readable_date(iso: &str) -> String {
    parse_datetime(iso)
        .map(|value| value.format("%A, %b %-d, %Y").to_string())
        .unwrap_or_else(|| iso.to_string())
}

/// "2026-08-04" → "Tue".
pub fn short_weekday(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|value| value.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// "2026-08-04T15:00" → "3 PM" (12-hour clock, no minutes).
pub fn hour_label(iso: &str) -> String {
    let Some(hour) = parse_hour(iso) else {
        return iso.to_string();
    };

    let twelve = match hour % 12 {
        0 => 12,
        value => value,
    };
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    format!("{twelve} {meridiem}")
}

fn parse_datetime(iso: &str) -> Option<NaiveDateTime> {
    let trimmed = iso.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_hour(iso: &str) -> Option<u32> {
    let (_, time) = iso.split_once('T')?;
    let hour = time.get(..2)?.parse::<u32>().ok()?;
    (hour < 24).then_some(hour)
}
