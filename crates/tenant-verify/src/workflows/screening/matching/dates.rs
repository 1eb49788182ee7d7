use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an extracted date, keeping only the calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (normalized to UTC first), and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    DATE_TIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|timestamp| timestamp.date())
    })
}

/// Render a parsed date as `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Compare two dates of birth (or similar) on the calendar day.
///
/// Falls back to trimmed literal equality when either side fails to parse. Blank values
/// never match.
pub fn dates_match(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return false;
    }

    match (parse_date(left), parse_date(right)) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}
