//! Per-resource column default tables.
//!
//! Each listing declares which columns get a substitute value when the
//! warehouse returns null. Columns not listed stay null.

use bidboard_core::{FlatRow, Scalar};

use crate::fields::date_or_fallback;

/// What to put in a column that came back empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// Null or empty string → `"1900-01-01"`.
    Date,
    /// Null → `false`.
    False,
    /// Null → the given text.
    Text(&'static str),
}

impl Fallback {
    fn fill(self, current: &Scalar) -> Option<Scalar> {
        match self {
            Fallback::Date if current.is_blank() => Some(date_or_fallback(current)),
            Fallback::False if current.is_null() => Some(Scalar::Boolean(false)),
            Fallback::Text(s) if current.is_null() => Some(Scalar::from(s)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    entries: &'static [(&'static str, Fallback)],
}

impl FallbackPolicy {
    pub const fn new(entries: &'static [(&'static str, Fallback)]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [(&'static str, Fallback)] {
        self.entries
    }

    pub fn get(&self, column: &str) -> Option<Fallback> {
        self.entries
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, fb)| *fb)
    }

    /// Substitute defaults in place. Returns how many cells were filled.
    pub fn apply(&self, row: &mut FlatRow) -> usize {
        let mut filled = 0;
        for (column, fallback) in self.entries {
            if let Some(value) = fallback.fill(row.get(column)) {
                row.insert(column, value);
                filled += 1;
            }
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: FallbackPolicy = FallbackPolicy::new(&[
        ("publish_date", Fallback::Date),
        ("final_status", Fallback::False),
        ("work_status", Fallback::Text("not_started")),
    ]);

    #[test]
    fn fills_nulls_and_missing_columns() {
        let mut row = FlatRow::new().with("publish_date", Scalar::Null);
        let filled = POLICY.apply(&mut row);
        assert_eq!(filled, 3);
        assert_eq!(row.get("publish_date"), &Scalar::from("1900-01-01"));
        assert_eq!(row.get("final_status"), &Scalar::Boolean(false));
        assert_eq!(row.get("work_status"), &Scalar::from("not_started"));
    }

    #[test]
    fn leaves_present_values_alone() {
        let mut row = FlatRow::new()
            .with("publish_date", "2025-01-31")
            .with("final_status", true)
            .with("work_status", "");
        assert_eq!(POLICY.apply(&mut row), 0);
        assert_eq!(row.get("publish_date"), &Scalar::from("2025-01-31"));
        assert_eq!(row.get("final_status"), &Scalar::Boolean(true));
        // only dates treat "" as absent
        assert_eq!(row.get("work_status"), &Scalar::from(""));
    }

    #[test]
    fn empty_date_string_counts_as_absent() {
        let mut row = FlatRow::new().with("publish_date", "");
        POLICY.apply(&mut row);
        assert_eq!(row.get("publish_date"), &Scalar::from("1900-01-01"));
    }

    #[test]
    fn lookup() {
        assert_eq!(POLICY.get("final_status"), Some(Fallback::False));
        assert_eq!(POLICY.get("title"), None);
        assert_eq!(POLICY.entries().len(), 3);
    }
}
