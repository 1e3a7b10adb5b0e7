//! Shared utility functions for the MAN overlay crates.

/// Date utility functions
pub mod dates {
    use chrono::{Local, NaiveDate};

    /// ISO calendar date format used on the wire and in query parameters.
    pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

    /// First day of the measurement archive; the date picker never goes earlier.
    pub fn earliest_start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2004, 10, 16).unwrap_or(NaiveDate::MIN)
    }

    /// Today's date in the local timezone.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT)?)
    }

    /// Parse an optional date field where an empty string means "unset".
    pub fn parse_optional_date(s: &str) -> anyhow::Result<Option<NaiveDate>> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            parse_date(s).map(Some)
        }
    }

    /// Whether the closed spans `[a_start, a_end]` and `[b_start, b_end]` overlap.
    pub fn spans_intersect(
        a_start: NaiveDate,
        a_end: NaiveDate,
        b_start: NaiveDate,
        b_end: NaiveDate,
    ) -> bool {
        a_start <= b_end && a_end >= b_start
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_rejects_compact_format() {
            assert!(parse_date("20230615").is_err());
        }

        #[test]
        fn test_parse_optional_date() {
            assert_eq!(parse_optional_date("").unwrap(), None);
            assert_eq!(parse_optional_date("  ").unwrap(), None);
            assert_eq!(
                parse_optional_date("2004-10-16").unwrap(),
                Some(earliest_start_date())
            );
        }

        #[test]
        fn test_spans_intersect() {
            let d = |m, day| NaiveDate::from_ymd_opt(2020, m, day).unwrap();
            assert!(spans_intersect(d(1, 1), d(3, 1), d(2, 1), d(4, 1)));
            assert!(spans_intersect(d(1, 1), d(3, 1), d(3, 1), d(4, 1)));
            assert!(spans_intersect(d(1, 1), d(12, 1), d(2, 1), d(3, 1)));
            assert!(!spans_intersect(d(1, 1), d(2, 1), d(2, 2), d(4, 1)));
        }
    }
}

/// Coordinate helpers
pub mod geo {
    pub const MIN_LATITUDE: f64 = -90.0;
    pub const MAX_LATITUDE: f64 = 90.0;
    pub const MIN_LONGITUDE: f64 = -180.0;
    pub const MAX_LONGITUDE: f64 = 180.0;

    /// Clamp a latitude into [-90, 90]. NaN passes through unchanged.
    pub fn clamp_latitude(lat: f64) -> f64 {
        lat.clamp(MIN_LATITUDE, MAX_LATITUDE)
    }

    /// Clamp a longitude into [-180, 180]. NaN passes through unchanged.
    pub fn clamp_longitude(lng: f64) -> f64 {
        lng.clamp(MIN_LONGITUDE, MAX_LONGITUDE)
    }

}
