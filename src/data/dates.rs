//! Date normalization
//!
//! Source files disagree on date layout, and some carry a time of day. Each
//! text is tried against an ordered list of chrono formats; the first one
//! yielding a real calendar date wins. Text matching none is unparseable,
//! never a default date.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// chrono's `%Y` takes any digit count, so "1/2/20" would read as year 20
const MIN_YEAR: i32 = 1000;

/// Month/day/year, ISO, day/month/year, their two-digit-year variants, then
/// common timestamp layouts
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone)]
pub struct DateNormalizer {
    formats: Vec<String>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl DateNormalizer {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    /// Normalize raw text to a calendar date, or `None` if unparseable
    pub fn normalize(&self, raw: &str) -> Option<NaiveDate> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        self.formats
            .iter()
            .find_map(|fmt| parse_with_format(text, fmt))
    }
}

fn parse_with_format(text: &str, fmt: &str) -> Option<NaiveDate> {
    let date = if has_time_component(fmt) {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(text, fmt).ok()
    };
    date.filter(|d| d.year() >= MIN_YEAR)
}

fn has_time_component(fmt: &str) -> bool {
    ["%H", "%I", "%M", "%S", "%T", "%R"]
        .iter()
        .any(|token| fmt.contains(*token))
}
