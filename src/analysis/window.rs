//! Trailing window arithmetic and parsing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("window is empty")]
    Empty,

    #[error("window '{0}' is not a number with an optional s/m/h/d suffix")]
    Malformed(String),

    #[error("window must be greater than zero")]
    Zero,
}

/// Lower bound of `[now - window, now]`. Saturates at the earliest
/// representable instant for windows longer than the calendar allows.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse `"90"`, `"90s"`, `"15m"`, `"1h"` or `"7d"`.
pub fn parse_window(raw: &str) -> Result<Duration, WindowError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WindowError::Empty);
    }

    let (digits, unit) = match raw.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&raw[..i], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(WindowError::Malformed(raw.to_string())),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WindowError::Malformed(raw.to_string()));
    }
    let value: u64 = digits
        .parse()
        .map_err(|_| WindowError::Malformed(raw.to_string()))?;
    if value == 0 {
        return Err(WindowError::Zero);
    }

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| WindowError::Malformed(raw.to_string()))
}
