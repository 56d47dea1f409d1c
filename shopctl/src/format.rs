//! Display formatting for money, percentages, counts and timestamps.
//!
//! Every page formats numbers through these helpers so that amounts read the same everywhere:
//! `₵1,234.56`, `12.34%`, `1,204`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Insert thousands separators into the integer part of an unsigned decimal string.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `₵1,234.56`; negatives render as `-₵1,234.56`.
pub fn currency(value: Decimal, symbol: &str) -> String {
    let rounded = round2(value);
    let body = group_thousands(&format!("{:.2}", rounded.abs()));
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

/// `12.34%`
pub fn percent(value: Decimal) -> String {
    let rounded = round2(value);
    // avoid "-0.00%"
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{rounded:.2}%")
}

/// Thousands-grouped number; integers stay integral, fractions keep up to 2 places.
pub fn number(value: Decimal) -> String {
    let rounded = round2(value).normalize();
    let body = group_thousands(&rounded.abs().to_string());
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{body}")
    } else {
        body
    }
}

/// `YYYY-MM-DD` for dates, `YYYY-MM-DD HH:MM` for timestamps. Unparsable input is returned as-is.
pub fn date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%a, %d %b %Y %H:%M:%S GMT"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Read a decimal out of a loosely-typed JSON value (number or numeric string).
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
        Value::String(s) => Decimal::from_str(s.trim().replace(',', "").as_str()).ok(),
        _ => None,
    }
}

/// Plain text for a JSON scalar; `null` and empty strings become `-`.
pub fn text_from_json(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

/// How a table cell or detail value is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Money,
    Percent,
    Number,
    Date,
    Bool,
    /// Short status word rendered as a coloured pill
    Badge,
    #[default]
    #[serde(other)]
    Text,
}

/// Render a loosely-typed JSON value according to its kind. Values that do not fit the kind
/// (a word in a money column, say) fall back to plain text.
pub fn render_value(kind: ValueKind, value: &Value, currency_symbol: &str) -> String {
    if value.is_null() {
        return "-".to_string();
    }
    match kind {
        ValueKind::Money => decimal_from_json(value).map(|d| currency(d, currency_symbol)),
        ValueKind::Percent => decimal_from_json(value).map(percent),
        ValueKind::Number => decimal_from_json(value).map(number),
        ValueKind::Date => value.as_str().map(date),
        ValueKind::Bool => match value {
            Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
            Value::Number(n) => Some(if n.as_i64() == Some(0) { "No" } else { "Yes" }.to_string()),
            _ => None,
        },
        ValueKind::Text | ValueKind::Badge => None,
    }
    .unwrap_or_else(|| text_from_json(value))
}
