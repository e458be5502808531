use crate::error::PipelineError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Price series dates are `YYYY/MM/DD`.
pub const PRICE_DATE_FORMAT: &str = "%Y/%m/%d";

const NEWS_TIMESTAMP_EXPECTED: &str = "ISO-8601 timestamp (UTC assumed when no offset is given)";

// Offset-bearing forms other than strict RFC 3339 (space separator, compact offsets).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a price-series date into a calendar date.
pub fn parse_price_date(s: &str) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(s.trim(), PRICE_DATE_FORMAT)
        .map_err(|_| PipelineError::malformed_date(s, PRICE_DATE_FORMAT))
}

/// Parses a news timestamp into a UTC instant.
///
/// Timestamps carrying an offset are converted to UTC. Timestamps without one are taken to
/// already be UTC, and a bare `YYYY-MM-DD` means midnight UTC.
pub fn parse_news_timestamp(s: &str) -> Result<DateTime<Utc>, PipelineError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(PipelineError::malformed_date(s, NEWS_TIMESTAMP_EXPECTED))
}

/// Daily key for a news instant: the UTC calendar date, never the publisher's local date.
pub fn news_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}
