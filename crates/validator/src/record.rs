//! Untyped input records and lenient scalar reading.
//!
//! Records arrive from HTML forms and JSON payloads, so the same logical
//! value can show up as `9`, `9.0`, `"9"` or `true`. The helpers here define
//! one consistent reading of those shapes, shared by the resolver, the
//! evaluator, and custom rules.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// A field name to untyped value mapping.
pub type Record = Map<String, Value>;

/// List fields normalized by [`prepare_for_validation`].
pub const LIST_FIELDS: [&str; 4] = ["amenities", "guarantee", "fire_protection_system", "security_type"];

// ============================================================================
// PRESENCE
// ============================================================================

/// `null`, an all-whitespace string, or an empty array.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Loose emptiness: `null`, `false`, `0`, `""`, `"0"`, and empty collections.
#[must_use]
pub fn is_loosely_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Loose truthiness of a flag field (`1`, `"1"`, `true`, `"true"`, `"on"`, `"yes"`).
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
        }
        _ => false,
    }
}

// ============================================================================
// SCALARS
// ============================================================================

/// Reads a number from a JSON number or a numeric string.
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            // `f64::from_str` also accepts "inf" and "nan".
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Reads a strict integer: whole JSON numbers and digit strings.
#[must_use]
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a catalog id the way membership checks compare values:
/// whole numbers, numeric strings with no fractional part, and booleans.
#[must_use]
pub fn as_member_id(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        other => as_number(other)
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64),
    }
}

/// Accepted boolean shapes: `true`, `false`, `0`, `1`, `"0"`, `"1"`.
#[must_use]
pub fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Text form of a scalar, used for loose comparison and error params.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) => "0".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose equality: numeric when both sides read as numbers, textual otherwise.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    let numeric = |v: &Value| match v {
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        other => as_number(other),
    };
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a == b,
        _ => scalar_text(left) == scalar_text(right),
    }
}

/// Counts the digits after the decimal point of a number's text form.
#[must_use]
pub fn decimal_places(value: &Value) -> usize {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return 0,
    };
    text.rsplit_once('.').map_or(0, |(_, decimals)| decimals.len())
}

/// Rounds half away from zero on the decimal digits of `value`, so `1.005`
/// becomes `1.01` even though its binary float sits just below.
///
/// Falls back to float rounding for text that is not plain decimal notation.
#[must_use]
pub fn round_decimal(value: &Value, places: u32) -> Option<f64> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    round_decimal_text(&text, places as usize).or_else(|| {
        let factor = 10_f64.powi(i32::try_from(places).ok()?);
        as_number(value).map(|number| (number * factor).round() / factor)
    })
}

fn round_decimal_text(text: &str, places: usize) -> Option<f64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let plain = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !plain(whole) || !plain(fraction) {
        return None;
    }

    let kept = &fraction[..places.min(fraction.len())];
    let mut digits: Vec<u8> = whole.bytes().chain(kept.bytes()).collect();
    digits.resize(whole.len() + places, b'0');
    if fraction.as_bytes().get(places).is_some_and(|next| *next >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let mut rounded = String::with_capacity(digits.len() + 2);
    if negative {
        rounded.push('-');
    }
    rounded.extend(digits[..split].iter().map(|b| char::from(*b)));
    if places > 0 {
        rounded.push('.');
        rounded.extend(digits[split..].iter().map(|b| char::from(*b)));
    }
    rounded.parse().ok()
}

// ============================================================================
// DATES
// ============================================================================

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parses the date shapes a form can send.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a date in one exact `strftime` format.
#[must_use]
pub fn parse_date_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

// ============================================================================
// FORM PREPARATION
// ============================================================================

/// Returns a copy of `record` with the list fields forced into arrays.
///
/// A scalar is wrapped, `null` or absence becomes `[]`, an object keeps its
/// values, and `""` / `null` elements are dropped. The remaining elements
/// are re-indexed from zero.
#[must_use]
pub fn prepare_for_validation(record: &Record) -> Record {
    let mut prepared = record.clone();
    for field in LIST_FIELDS {
        let items = match record.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(map)) => map.values().cloned().collect(),
            Some(scalar) => vec![scalar.clone()],
        };
        let kept: Vec<Value> = items
            .into_iter()
            .filter(|item| !item.is_null() && item.as_str() != Some(""))
            .collect();
        prepared.insert(field.to_owned(), Value::Array(kept));
    }
    prepared
}
