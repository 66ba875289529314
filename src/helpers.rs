// 🕒 Time helpers - JPL calendar dates in, "YYYY-MM-DD HH:MM" out

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Calendar-date format used by the JPL close-approach API ("1900-Jan-01 00:11")
pub const CD_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Output format for approach times
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a JPL calendar date ("cd" column) into a NaiveDateTime (UTC)
pub fn cd_to_datetime(calendar_date: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(calendar_date.trim(), CD_FORMAT)
        .with_context(|| format!("Invalid calendar date: {:?}", calendar_date))
}

/// Format a datetime as "YYYY-MM-DD HH:MM"
pub fn datetime_to_str(dt: &NaiveDateTime) -> String {
    dt.format(OUTPUT_FORMAT).to_string()
}

/// Parse a "YYYY-MM-DD" date (CLI and criteria files)
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {:?}", date))
}
