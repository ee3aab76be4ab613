// Display formatting shared by derivation rules.

use serde_json::Value;

use crate::error::DerivationError;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Render an uptime in seconds as `"{d}d {h}hr {m}min"`, omitting zero parts.
///
/// Anything under a minute is `"Less than 1 min"`.
pub fn format_uptime(seconds: i64) -> String {
    if seconds < MINUTE {
        return "Less than 1 min".into();
    }
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;

    [(days, "d"), (hours, "hr"), (minutes, "min")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole seconds from a JSON number or numeric string, truncating fractions.
pub fn seconds_from(field: &'static str, value: &Value) -> Result<i64, DerivationError> {
    let secs = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or(DerivationError::WrongType {
        field,
        expected: "a number of seconds",
    })?;
    float_to_i64(field, secs.trunc())
}

/// Bytes per second to whole kilobits-per-second as the controller UI shows
/// them: `floor(rate / 1024)`.
pub fn kbps(field: &'static str, rate: f64) -> Result<i64, DerivationError> {
    float_to_i64(field, (rate / 1024.0).floor())
}

#[allow(clippy::as_conversions, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_i64(field: &'static str, value: f64) -> Result<i64, DerivationError> {
    if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(DerivationError::OutOfRange { field })
    }
}
