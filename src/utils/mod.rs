use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Calendar date of a server timestamp. Accepts RFC 3339, naive ISO date-times and plain dates.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in formats.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    let date_formats = ["%Y-%m-%d", "%d.%m.%Y"];
    for fmt in date_formats.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_dates_in_several_shapes() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 5);
        assert_eq!(parse_date("2026-10-05T09:30:00Z"), expected);
        assert_eq!(parse_date("2026-10-05T09:30:00.1234567"), expected);
        assert_eq!(parse_date("2026-10-05"), expected);
        assert_eq!(parse_date("05.10.2026"), expected);
        assert_eq!(parse_date("вчера"), None);
    }

    #[test]
    fn case_insensitive_match_handles_cyrillic() {
        assert!(contains_ci("Гайка М8 оцинкованная", "гайка"));
        assert!(!contains_ci("Болт", "гайка"));
    }
}
