//! Loose value coercion used when rendering prediction fields.
//!
//! Record cells can be numbers, numeric strings, or junk. Numbers are coerced
//! the lenient way a browser's `parseFloat` does, and anything that fails to
//! coerce turns into `NaN` text instead of an error.

use serde_json::Value;

/// Coerces a cell to `f64`. Strings are parsed by their leading numeric
/// prefix; non-numeric values yield `NaN`.
pub fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

fn parse_float_prefix(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Fixed-point rendering with `digits` decimals. Non-finite values render as
/// `NaN`, `Infinity`, `-Infinity`. Exact halfway values round away from zero
/// (`32.25` to one digit is `32.3`).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // -0.0 prints without a sign
    let value = if value == 0.0 { 0.0 } else { value };
    if !is_exact_tie(value, digits) {
        return format!("{value:.digits$}");
    }

    // A tie has exactly `digits + 1` fractional digits, so this is exact.
    let mut wide = format!("{value:.prec$}", prec = digits + 1);
    wide.pop();
    if wide.ends_with('.') {
        wide.pop();
    }
    increment_last_digit(wide)
}

/// `value` sits exactly halfway between two `digits`-decimal numbers iff
/// `value * 2^(digits + 1)` is an odd integer. Scaling by a power of two is
/// exact.
fn is_exact_tie(value: f64, digits: usize) -> bool {
    let Ok(exp) = i32::try_from(digits + 1) else {
        return false;
    };
    let scaled = value.abs() * 2f64.powi(exp);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

/// Adds one unit in the last place of a decimal string, ignoring sign.
fn increment_last_digit(number: String) -> String {
    let mut bytes = number.into_bytes();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'9' => bytes[i] = b'0',
            b'0'..=b'8' => {
                bytes[i] += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
            _ => {}
        }
    }
    let at = usize::from(bytes.first() == Some(&b'-'));
    bytes.insert(at, b'1');
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Renders a cell verbatim: strings as-is, integral numbers without a
/// fraction, missing values as an empty string.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
        }
        other => other.to_string(),
    }
}

/// True only for a JSON number equal to 1. `"1"`, `true` and missing are not.
pub fn is_one(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.as_f64() == Some(1.0))
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
