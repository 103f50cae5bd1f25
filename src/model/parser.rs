// File: ./src/model/parser.rs
// Handles date/time input normalization and display formatting
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};

/// Normalizes a date to `YYYY-MM-DD`, or returns an empty string if it is not a date.
///
/// Accepts plain ISO dates, ISO timestamps (as returned by spreadsheet date cells)
/// and US-style `M/D/YYYY`.
pub fn normalize_date(input: &str) -> String {
    let raw = input.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt
            .with_timezone(&Local)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return d.format("%Y-%m-%d").to_string();
    }
    // "2025-03-14 19:00" and similar
    if let Some(prefix) = raw.get(..10)
        && let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return d.format("%Y-%m-%d").to_string();
    }
    String::new()
}

/// Normalizes a time of day to 24h `HH:MM`, or returns an empty string.
///
/// Accepts `HH:MM`, `HH:MM:SS`, `h:mm AM/PM` (with or without the space) and ISO timestamps.
pub fn normalize_time(input: &str) -> String {
    let raw = input.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return t.format("%H:%M").to_string();
    }
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return t.format("%H:%M").to_string();
    }
    if let Some(t) = parse_meridiem(raw) {
        return t.format("%H:%M").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).time().format("%H:%M").to_string();
    }
    String::new()
}

fn parse_meridiem(raw: &str) -> Option<NaiveTime> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_uppercase();
    let (clock, pm) = if let Some(c) = compact.strip_suffix("PM") {
        (c, true)
    } else if let Some(c) = compact.strip_suffix("AM") {
        (c, false)
    } else {
        return None;
    };

    let (h, m) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };
    if !(1..=12).contains(&h) || m > 59 {
        return None;
    }
    let hour = match (h, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, m, 0)
}

/// `14:30` -> `2:30PM`. Anything that is not a stored time displays as blank.
pub fn display_time(stored: &str) -> String {
    let Ok(t) = NaiveTime::parse_from_str(stored.trim(), "%H:%M") else {
        return String::new();
    };
    let (pm, hour) = t.hour12();
    format!(
        "{}:{:02}{}",
        hour,
        t.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// `March 14, 2025` (long) or `Mar 14, 2025` (short); `TBD` when there is no usable date.
pub fn display_date(stored: &str, is_tbd: bool, long: bool) -> String {
    if is_tbd {
        return "TBD".to_string();
    }
    match NaiveDate::parse_from_str(stored.trim(), "%Y-%m-%d") {
        Ok(d) if long => d.format("%B %-d, %Y").to_string(),
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => "TBD".to_string(),
    }
}

/// Reads a leading integer the way a form field would: `"12"`, `" 40 people"` -> 40, junk -> 0.
pub fn parse_count(raw: &str) -> i64 {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_from_meridiem() {
        let stored = normalize_time("2:30 PM");
        assert_eq!(stored, "14:30");
        assert_eq!(display_time(&stored), "2:30PM");
        assert_eq!(normalize_time("12:15am"), "00:15");
        assert_eq!(normalize_time("12:00 PM"), "12:00");
        assert_eq!(normalize_time("7 pm"), "19:00");
    }

    #[test]
    fn time_with_seconds() {
        assert_eq!(normalize_time("14:05:00"), "14:05");
        assert_eq!(normalize_time("09:00"), "09:00");
    }

    #[test]
    fn malformed_time_is_blank() {
        assert_eq!(normalize_time("soon"), "");
        assert_eq!(normalize_time("13:00 PM"), "");
        assert_eq!(normalize_time("25:00"), "");
        assert_eq!(display_time("later"), "");
    }

    #[test]
    fn dates() {
        assert_eq!(normalize_date("2025-03-14"), "2025-03-14");
        assert_eq!(normalize_date("2025-03-14T12:00:00Z"), "2025-03-14");
        assert_eq!(normalize_date("03/14/2025"), "2025-03-14");
        assert_eq!(normalize_date("2025-03-14 19:00"), "2025-03-14");
        assert_eq!(normalize_date("next friday"), "");
        assert_eq!(normalize_date("  "), "");
    }

    #[test]
    fn date_display() {
        assert_eq!(display_date("2025-03-04", false, true), "March 4, 2025");
        assert_eq!(display_date("2025-03-04", false, false), "Mar 4, 2025");
        assert_eq!(display_date("", true, true), "TBD");
    }

    #[test]
    fn counts() {
        assert_eq!(parse_count("40"), 40);
        assert_eq!(parse_count(" 12 people"), 12);
        assert_eq!(parse_count("3.7"), 3);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("many"), 0);
    }
}
