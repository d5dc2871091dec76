//! The `limit` query parameter.

use std::fmt;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 1000;

/// A validated row-count limit in `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Limit(u32);

impl Limit {
    pub fn new(n: u32) -> Result<Self, LimitError> {
        if (1..=MAX_LIMIT).contains(&n) {
            Ok(Self(n))
        } else {
            Err(LimitError::Invalid { raw: n.to_string() })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LimitError {
    /// Message is the public error body; `raw` is for logs only.
    #[error("Invalid limit")]
    Invalid { raw: String },
}

/// Parse and bounds-check a raw `limit` value.
///
/// Absent, blank, non-numeric and NaN inputs fall back to [`DEFAULT_LIMIT`].
/// Anything else must be a whole number in `1..=MAX_LIMIT`.
pub fn validate_limit(raw: Option<&str>) -> Result<Limit, LimitError> {
    let parsed = raw.map(str::trim).filter(|s| !s.is_empty()).and_then(parse_number);

    let Some(n) = parsed else {
        return Ok(Limit::default());
    };

    // fract() of an infinity is NaN, so infinities fail here too.
    if n.fract() == 0.0 && n >= 1.0 && n <= MAX_LIMIT as f64 {
        Ok(Limit(n as u32))
    } else {
        Err(LimitError::Invalid {
            raw: raw.unwrap_or_default().to_string(),
        })
    }
}

/// Numeric literal grammar of a query-string number: decimal with optional
/// sign and exponent, unsigned `0x`/`0o`/`0b` integers, and the exact
/// spellings `Infinity`, `+Infinity`, `-Infinity`. Anything else is `None`.
fn parse_number(s: &str) -> Option<f64> {
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        // valid digits that overflow are just a very large number
        return Some(u128::from_str_radix(digits, radix).map_or(f64::INFINITY, |n| n as f64));
    }

    // f64::from_str also takes "inf", "nan" and friends; keep to plain decimals
    if !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) {
        return None;
    }
    s.parse::<f64>().ok()
}
