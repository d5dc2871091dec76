use bidboard_core::{FlatRow, Scalar};

use crate::result::AthenaQueryResult;

/// Convert an Athena result set into flat rows, keeping result order.
///
/// # Type Mapping
///
/// Athena hands every cell back as a string; the declared column type picks
/// the [`Scalar`] variant:
/// - `bigint`, `int`, `integer`, `smallint`, `tinyint` → `Integer`
/// - `double`, `float`, `real`, `decimal(p,s)` → `Float`
/// - `boolean` → `Boolean`
/// - everything else (`varchar`, `char(n)`, `date`, `timestamp`, …) → `Text`
///
/// A value that fails to parse as its declared type is kept as `Text`.
/// SQL NULL becomes `Scalar::Null`; every row carries every column.
pub fn result_to_rows(result: &AthenaQueryResult) -> Vec<FlatRow> {
    result
        .rows
        .iter()
        .map(|row| {
            let mut flat = FlatRow::with_capacity(result.columns.len());
            for (i, col) in result.columns.iter().enumerate() {
                let value = match row.get(i) {
                    Some(Some(raw)) => parse_scalar(raw, &col.data_type),
                    _ => Scalar::Null,
                };
                flat.insert(&col.name, value);
            }
            flat
        })
        .collect()
}

/// Parse one cell according to its Athena data type.
pub(crate) fn parse_scalar(value: &str, data_type: &str) -> Scalar {
    let normalized = data_type.to_lowercase();
    // Parameterized types ("decimal(10,2)", "varchar(255)") match on the base name.
    let base = normalized.split('(').next().unwrap_or("").trim();

    match base {
        "bigint" | "int" | "integer" | "smallint" | "tinyint" => value
            .parse::<i64>()
            .map(Scalar::Integer)
            .unwrap_or_else(|_| Scalar::Text(value.to_string())),
        "double" | "float" | "real" | "decimal" => value
            .parse::<f64>()
            .map(Scalar::Float)
            .unwrap_or_else(|_| Scalar::Text(value.to_string())),
        "boolean" => match value.to_lowercase().as_str() {
            "true" | "1" => Scalar::Boolean(true),
            "false" | "0" => Scalar::Boolean(false),
            _ => Scalar::Text(value.to_string()),
        },
        _ => Scalar::Text(value.to_string()),
    }
}
