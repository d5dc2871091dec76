use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single cell value. Warehouse data arrives as strings; the column type
/// decides which variant it lands in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Null or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Extract as string slice, returning None for anything but Text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// String form of the value, `None` for Null. Integers print without
    /// decoration, integral floats print without a fractional part.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Boolean(b) => Some(b.to_string()),
            Scalar::Integer(n) => Some(n.to_string()),
            Scalar::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

static NULL: Scalar = Scalar::Null;

/// One record returned by the warehouse: column name to scalar, in result-set
/// column order. Reading a column that isn't there yields Null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRow {
    fields: IndexMap<String, Scalar>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { fields: IndexMap::with_capacity(n) }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: &str, value: impl Into<Scalar>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Scalar>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> &Scalar {
        self.fields.get(column).unwrap_or(&NULL)
    }

    /// Owned copy of a cell, for moving into output structs.
    pub fn value(&self, column: &str) -> Scalar {
        self.get(column).clone()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Text form of a cell (see [`Scalar::to_text`]).
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).to_text()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Scalar)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_reads_as_null() {
        let row = FlatRow::new().with("a", 1i64);
        assert_eq!(row.get("a"), &Scalar::Integer(1));
        assert!(row.get("b").is_null());
        assert_eq!(row.text("b"), None);
        assert!(!row.contains("b"));
    }

    #[test]
    fn text_form_of_scalars() {
        assert_eq!(Scalar::Integer(42).to_text().as_deref(), Some("42"));
        assert_eq!(Scalar::Float(7.0).to_text().as_deref(), Some("7"));
        assert_eq!(Scalar::Float(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(Scalar::Boolean(true).to_text().as_deref(), Some("true"));
        assert_eq!(Scalar::from("x").to_text().as_deref(), Some("x"));
        assert_eq!(Scalar::Null.to_text(), None);
    }

    #[test]
    fn blank_covers_null_and_empty_text() {
        assert!(Scalar::Null.is_blank());
        assert!(Scalar::from("").is_blank());
        assert!(!Scalar::from(" ").is_blank());
        assert!(!Scalar::Integer(0).is_blank());
    }

    #[test]
    fn serializes_as_plain_json_scalars() {
        let row = FlatRow::new()
            .with("id", 3i64)
            .with("name", "acme")
            .with("ok", true)
            .with("gone", Scalar::Null);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "name": "acme", "ok": true, "gone": null})
        );
    }

    #[test]
    fn column_order_is_preserved() {
        let row = FlatRow::new().with("z", 1i64).with("a", 2i64).with("m", 3i64);
        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["z", "a", "m"]);
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<&str> = None;
        assert_eq!(Scalar::from(none), Scalar::Null);
        assert_eq!(Scalar::from(Some(5i64)), Scalar::Integer(5));
    }
}
