
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a string in dayplan.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

pub fn record_file_name(date: NaiveDate) -> String {
    format!("{}.json", date_to_record_name(date))
}

pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, RECORD_DATE_FORMAT).ok()
}

/// Accepts "2025-03-15" as well as phrases like "yesterday" or "15/03/2025" (day first).
pub fn parse_date_arg(input: &str, now: DateTime<Local>) -> Result<NaiveDate> {
    if let Some(date) = parse_iso_date(input) {
        return Ok(date);
    }
    parse_date_string(input, now, Dialect::Uk)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Invalid date '{input}': {e}. Use YYYY-MM-DD"))
}
