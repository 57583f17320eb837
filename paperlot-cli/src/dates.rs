use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use paperlot_core::{PaperlotError, Result};

/// Parse a report-window bound. Empty input means "use the engine default"
/// (epoch for Since, now for To). Accepted formats: RFC 3339,
/// `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(input: &str) -> Result<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(Utc.from_utc_datetime(&naive)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }

    Err(PaperlotError::validation(format!(
        "Unrecognized date: '{}'. Use YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_the_default() {
        assert!(parse_date("").unwrap().is_none());
        assert!(parse_date("   ").unwrap().is_none());
    }

    #[test]
    fn plain_date_is_midnight_utc() {
        let dt = parse_date("2024-03-01").unwrap().unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn datetime_and_rfc3339_parse() {
        assert!(parse_date("2024-03-01 12:30:00").unwrap().is_some());
        assert!(parse_date("2024-03-01T12:30:00Z").unwrap().is_some());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_date("yesterday-ish"),
            Err(PaperlotError::Validation(_))
        ));
    }
}
