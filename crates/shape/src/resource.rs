//! The contract every listing endpoint implements.

use bidboard_core::FlatRow;
use serde::Serialize;
use tracing::{debug, warn};

use crate::fallback::FallbackPolicy;
use crate::group::Grouped;
use crate::limit::Limit;
use crate::template::QueryTemplate;

/// One listing: its SQL, the columns that SQL promises, the defaults for
/// those columns, and how rows fold into entities.
pub trait Resource {
    type Entity: Serialize + Send;

    /// Short name used in logs and on the command line.
    const NAME: &'static str;

    /// Columns the template selects. Absent columns are logged and read as null.
    const COLUMNS: &'static [&'static str];

    const TEMPLATE: QueryTemplate;

    const FALLBACKS: FallbackPolicy;

    fn group(rows: &[FlatRow]) -> Grouped<Self::Entity>;
}

pub fn render_query<R: Resource>(table_prefix: &str, limit: Limit) -> String {
    R::TEMPLATE.render(table_prefix, limit)
}

/// Rows → entities: check the column contract, apply fallbacks, group, and
/// cut the output to `limit` parents.
pub fn materialize<R: Resource>(mut rows: Vec<FlatRow>, limit: Limit) -> Vec<R::Entity> {
    if let Some(first) = rows.first() {
        let missing: Vec<&str> = R::COLUMNS
            .iter()
            .copied()
            .filter(|c| !first.contains(c))
            .collect();
        if !missing.is_empty() {
            warn!(resource = R::NAME, missing = ?missing, "Result is missing contract columns");
        }
    }

    let filled: usize = rows.iter_mut().map(|row| R::FALLBACKS.apply(row)).sum();

    let Grouped {
        mut entities,
        skipped_rows,
    } = R::group(&rows);

    if skipped_rows > 0 {
        warn!(resource = R::NAME, skipped_rows, "Rows without a parent key were dropped");
    }

    entities.truncate(limit.as_usize());

    debug!(
        resource = R::NAME,
        rows = rows.len(),
        entities = entities.len(),
        fallbacks_filled = filled,
        "Materialized listing"
    );

    entities
}
