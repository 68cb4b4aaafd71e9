use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::{AppError, Result};
use crate::store::date_at_utc_midnight;

/// Strict `YYYY-MM-DD`, zero padded.
pub fn parse_day(raw: &str) -> Result<DateTime<FixedOffset>> {
    let invalid = || AppError::BadRequest("invalid date format, expected YYYY-MM-DD".to_string());

    if raw.len() != 10 {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(date_at_utc_midnight)
        .map_err(|_| invalid())
}
