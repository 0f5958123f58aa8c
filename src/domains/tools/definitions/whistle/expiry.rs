//! Whistle expiry parsing.
//!
//! An expiry is either the literal `"never"` or an instant. Clients send dates
//! in a handful of day-first and year-first layouts; the backend wants
//! ISO-8601 in UTC (`2030-01-31T00:00:00Z`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::domains::tools::error::ValidationError;

/// Expiry value meaning "no expiry".
pub const NEVER: &str = "never";

/// Date-time layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Date-only layouts (midnight UTC), tried after the date-time ones.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Convert an expiry to the backend representation without checking that it
/// lies in the future.
///
/// `"never"` (any case) maps to `"never"`. A timestamp that already carries a
/// zone (`Z` or an offset) is returned unchanged.
pub fn convert_to_iso_format(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case(NEVER) {
        return Ok(NEVER.to_string());
    }
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(value.to_string());
    }

    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ValidationError::UnparseableDate(value.to_string()))?;

    Ok(parsed.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Validate an expiry against the current time.
pub fn validate_expiry(raw: &str) -> Result<String, ValidationError> {
    validate_expiry_at(raw, Utc::now())
}

/// Validate an expiry against `now`: it must be `"never"` or strictly later.
pub fn validate_expiry_at(raw: &str, now: DateTime<Utc>) -> Result<String, ValidationError> {
    let iso = convert_to_iso_format(raw)?;
    if iso == NEVER {
        return Ok(iso);
    }

    let instant = DateTime::parse_from_rfc3339(&iso)
        .map_err(|_| ValidationError::UnparseableDate(raw.trim().to_string()))?
        .with_timezone(&Utc);
    if instant <= now {
        return Err(ValidationError::ExpiryInPast(iso));
    }
    Ok(iso)
}
