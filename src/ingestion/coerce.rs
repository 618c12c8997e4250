//! Heuristic typing of a single raw cell.

use crate::types::RecordValue;

/// Decide the semantic type of one raw field.
///
/// - empty input is [`RecordValue::Null`]
/// - one leading and one trailing `"` are stripped when both are present
/// - a non-empty remainder that is a finite numeric literal becomes [`RecordValue::Int`] (fits
///   `i64`) or [`RecordValue::Float`]
/// - anything else is returned as [`RecordValue::Text`]
///
/// Leading zeros are not significant: `"007"` is the number `7`.
pub fn coerce(raw: &str) -> RecordValue {
    if raw.is_empty() {
        return RecordValue::Null;
    }

    let clean = strip_outer_quotes(raw);
    if clean.is_empty() {
        return RecordValue::Text(String::new());
    }

    match parse_number(clean) {
        Some(n) => n,
        None => RecordValue::Text(clean.to_owned()),
    }
}

fn strip_outer_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn parse_number(s: &str) -> Option<RecordValue> {
    if !looks_numeric(s) {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(RecordValue::Int(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(RecordValue::Float(v)),
        _ => None,
    }
}

// Plain decimal literal: sign, digits with at most one '.', optional exponent.
// Rejects spellings Rust's float parser would otherwise accept ("inf", "NaN").
fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        None => true,
        Some(e) => {
            let e = e.strip_prefix(['-', '+']).unwrap_or(e);
            !e.is_empty() && e.chars().all(|c| c.is_ascii_digit())
        }
    }
}
