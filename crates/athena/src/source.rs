//! The row-source seam between HTTP handlers and the warehouse.

use async_trait::async_trait;
use bidboard_core::FlatRow;

use crate::client::AthenaError;

/// Failure to produce rows for a query. Never shown to API clients.
#[derive(Debug, thiserror::Error)]
pub enum RowSourceError {
    #[error(transparent)]
    Athena(#[from] AthenaError),
}

/// Anything that turns SQL text into an ordered list of flat rows.
///
/// Implementations must return the complete result; callers shape it only
/// after it has fully arrived.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<FlatRow>, RowSourceError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}
