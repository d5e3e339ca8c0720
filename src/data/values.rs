//! Numeric value coercion

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// Cell texts read as "no value" (pandas' default NA markers)
const NA_MARKERS: &[&str] = &["na", "n/a", "#n/a", "nan", "null", "none", "-"];

/// Characters removed before parsing: grouping separators other than the
/// comma, and currency symbols
const STRIP_CHARS: &[char] = &['_', ' ', '\u{a0}', '\'', '$', '€', '£', '¥'];

/// Comma grouping is only accepted in threes, in the integer part
static COMMA_GROUPED: OnceLock<Regex> = OnceLock::new();

fn comma_grouped() -> &'static Regex {
    COMMA_GROUPED.get_or_init(|| {
        Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d*)?([eE][+-]?\d+)?$")
            .expect("grouping pattern is valid")
    })
}

/// Outcome of coercing one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoercedValue {
    /// Finite number
    Value(f64),
    /// Blank or NA cell; a gap the fill stage may repair
    Missing,
    /// Text that is not a finite number
    Unparseable,
}

/// Coerce raw cell text to a finite `f64`
pub fn coerce_value(raw: &str) -> CoercedValue {
    let text = raw.trim();
    if is_missing(text) {
        return CoercedValue::Missing;
    }

    let Some(cleaned) = clean_numeric(text) else {
        return CoercedValue::Unparseable;
    };

    // Out-of-range magnitudes for Decimal still parse as f64
    let value = parse_cleaned(&cleaned)
        .and_then(|d| d.to_f64())
        .or_else(|| f64::from_str(&cleaned).ok());

    match value {
        Some(v) if v.is_finite() => CoercedValue::Value(v),
        _ => CoercedValue::Unparseable,
    }
}

/// Parse numeric text exactly, after stripping separators and currency
/// symbols. Accepts plain and scientific notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    clean_numeric(raw).and_then(|cleaned| parse_cleaned(&cleaned))
}

/// Strip currency and grouping characters. A comma survives only as a
/// thousands separator; any other comma makes the text unparseable.
fn clean_numeric(raw: &str) -> Option<String> {
    let cleaned: String = raw.trim().chars().filter(|c| !STRIP_CHARS.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }

    if !cleaned.contains(',') {
        return Some(cleaned);
    }
    if comma_grouped().is_match(&cleaned) {
        Some(cleaned.replace(',', ""))
    } else {
        None
    }
}

fn parse_cleaned(cleaned: &str) -> Option<Decimal> {
    Decimal::from_str(cleaned).ok().or_else(|| {
        if cleaned.contains(|c: char| c == 'e' || c == 'E') {
            Decimal::from_scientific(cleaned).ok()
        } else {
            None
        }
    })
}

fn is_missing(text: &str) -> bool {
    text.is_empty() || NA_MARKERS.iter().any(|m| text.eq_ignore_ascii_case(m))
}
