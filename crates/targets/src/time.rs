//! Time-string resolution for the `{time}` placeholder
//!
//! Accepted inputs, tried in order:
//! - `now` (any case)
//! - Unix epoch seconds
//! - `%Y-%m-%dT%H:%M:%S`, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d`
//! - anything else is used literally

use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{Result, TargetError};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve `input` against the current local time
pub fn resolve_time(input: &str, format: &str) -> Result<String> {
    resolve_time_at(input, format, Local::now())
}

/// Resolve `input`, using `now` for the `now` keyword
pub fn resolve_time_at(input: &str, format: &str, now: DateTime<Local>) -> Result<String> {
    match parse_time(input, now) {
        Some(dt) => render(&dt, format),
        None => Ok(input.to_string()),
    }
}

fn parse_time(input: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    if input.eq_ignore_ascii_case("now") {
        return Some(now);
    }

    if let Ok(epoch) = input.parse::<i64>() {
        return Local.timestamp_opt(epoch, 0).single();
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

// `DelayedFormat`'s Display fails on unknown specifiers; write! surfaces that
// as an error instead of a panic.
fn render(dt: &DateTime<Local>, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).map_err(|_| TargetError::TimeFormat {
        format: format.to_string(),
    })?;
    Ok(out)
}
