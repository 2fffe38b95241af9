use time::{macros::format_description, Date, OffsetDateTime};

use crate::error::ApiError;

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::Validation(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// The date given by the client, or today in UTC.
pub fn date_or_today(date: Option<Date>) -> Date {
    date.unwrap_or_else(today_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-03-09").unwrap(), date!(2024 - 03 - 09));
        assert_eq!(parse_date(" 2024-12-31 ").unwrap(), date!(2024 - 12 - 31));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(parse_date("09/03/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
