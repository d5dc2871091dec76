//! Field-level rendering rules shared by every listing.

use bidboard_core::Scalar;
use serde::{Deserialize, Serialize};

/// Rendered in place of a missing date or timestamp.
pub const DATE_FALLBACK: &str = "1900-01-01";

/// Minimum width of a rendered sequence number.
pub const SEQUENCE_WIDTH: usize = 8;

// ── Identifier prefixes ──────────────────────────────────────────

/// Entity families whose identifiers are exposed with a short prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Announcement,
    Company,
    Branch,
    Requirement,
    Orderer,
    Partner,
}

impl IdPrefix {
    pub const ALL: [IdPrefix; 6] = [
        IdPrefix::Announcement,
        IdPrefix::Company,
        IdPrefix::Branch,
        IdPrefix::Requirement,
        IdPrefix::Orderer,
        IdPrefix::Partner,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Announcement => "ann-",
            IdPrefix::Company => "com-",
            IdPrefix::Branch => "brn-",
            IdPrefix::Requirement => "req-",
            IdPrefix::Orderer => "ord-",
            IdPrefix::Partner => "ptn-",
        }
    }

    /// Prefix + the raw identifier's string form. Null stays null.
    pub fn apply(self, raw: &Scalar) -> Option<String> {
        raw.to_text().map(|id| format!("{}{}", self.as_str(), id))
    }
}

// ── Sequence numbers and dates ───────────────────────────────────

/// Left-pad with `'0'` to [`SEQUENCE_WIDTH`]. Longer values pass through.
pub fn pad_sequence(raw: &Scalar) -> Option<String> {
    raw.to_text().map(|s| format!("{:0>width$}", s, width = SEQUENCE_WIDTH))
}

/// The value itself, or [`DATE_FALLBACK`] when null or empty.
pub fn date_or_fallback(raw: &Scalar) -> Scalar {
    if raw.is_blank() {
        Scalar::from(DATE_FALLBACK)
    } else {
        raw.clone()
    }
}

// ── Status ───────────────────────────────────────────────────────

/// Loose truthiness of a warehouse flag: `true`, non-zero numbers and the
/// strings "true" / "1" (any case).
pub fn is_truthy(raw: &Scalar) -> bool {
    match raw {
        Scalar::Boolean(b) => *b,
        Scalar::Integer(n) => *n != 0,
        Scalar::Float(f) => *f != 0.0 && !f.is_nan(),
        Scalar::Text(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Scalar::Null => false,
    }
}

/// Outcome of evaluating a company against an announcement's requirements.
///
/// `OtherOnlyUnmet` is part of the published contract but is never derived:
/// the warehouse only carries a single pass/fail flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    AllMet,
    OtherOnlyUnmet,
    Unmet,
}

impl EvaluationStatus {
    pub fn from_final_status(raw: &Scalar) -> Self {
        if is_truthy(raw) {
            EvaluationStatus::AllMet
        } else {
            EvaluationStatus::Unmet
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::AllMet => "all_met",
            EvaluationStatus::OtherOnlyUnmet => "other_only_unmet",
            EvaluationStatus::Unmet => "unmet",
        }
    }
}
