use serde::{Deserialize, Serialize};

/// Column definition returned by an Athena query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaColumn {
    /// Column name as declared in the result set.
    pub name: String,
    /// Athena data type (e.g. "varchar", "bigint", "double", "boolean", "date").
    pub data_type: String,
}

/// Execution metadata for a completed Athena query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Athena query execution ID.
    pub query_id: String,
    /// Total bytes scanned during execution.
    pub bytes_scanned: u64,
    /// Engine execution time in milliseconds.
    pub execution_time_ms: u64,
    /// Final execution state ("SUCCEEDED", "FAILED", "CANCELLED").
    pub state: String,
    /// S3 output location where results were written, if available.
    pub output_location: Option<String>,
}

/// Raw result set of one query, all pages concatenated.
///
/// Rows are `Vec<Option<String>>` where `None` is SQL NULL; cell order
/// matches `columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaQueryResult {
    pub columns: Vec<AthenaColumn>,
    pub rows: Vec<Vec<Option<String>>>,
    pub metadata: QueryMetadata,
    /// Number of `GetQueryResults` pages fetched.
    #[serde(default)]
    pub pages: u32,
}

/// Athena pricing: $5 per TB scanned.
const DOLLARS_PER_BYTE: f64 = 5.0 / (1024.0 * 1024.0 * 1024.0 * 1024.0);

impl AthenaQueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at `row` / `col`; `None` for out-of-range, unknown column, or NULL.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let col_idx = self.column_index(col)?;
        self.rows.get(row)?.get(col_idx)?.as_deref()
    }

    /// Estimated query cost in USD based on Athena's $5/TB pricing.
    pub fn cost_estimate_usd(&self) -> f64 {
        self.metadata.bytes_scanned as f64 * DOLLARS_PER_BYTE
    }
}
