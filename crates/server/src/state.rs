use std::sync::Arc;

use bidboard_athena::RowSource;
use chrono::{DateTime, Utc};

/// Read-only state shared by every request.
pub struct AppState {
    pub source: Arc<dyn RowSource>,
    /// Validated table qualifier substituted into every listing query.
    pub table_prefix: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(source: Arc<dyn RowSource>, table_prefix: impl Into<String>) -> Self {
        Self {
            source,
            table_prefix: table_prefix.into(),
            started_at: Utc::now(),
        }
    }
}
