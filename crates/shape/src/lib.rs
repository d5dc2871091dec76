//! Turning flat warehouse rows into the nested listing payloads.
//!
//! - [`group`]: generic key-map grouping of rows into parent entities
//! - [`fields`]: identifier prefixes, sequence padding, date fallback, status
//! - [`fallback`]: per-resource column default tables
//! - [`limit`]: the `limit` query parameter
//! - [`template`]: SQL text with `{prefix}` / `{limit}` placeholders
//! - [`resource`] / [`resources`]: one contract per listing endpoint

pub mod fallback;
pub mod fields;
pub mod group;
pub mod limit;
pub mod resource;
pub mod resources;
pub mod template;

pub use fallback::{Fallback, FallbackPolicy};
pub use fields::{EvaluationStatus, IdPrefix, DATE_FALLBACK};
pub use group::{entry_by, push_unique, push_unique_by, Grouped, Grouper};
pub use limit::{validate_limit, Limit, LimitError, DEFAULT_LIMIT, MAX_LIMIT};
pub use resource::{materialize, render_query, Resource};
pub use resources::{Announcements, Companies, Evaluations, Orderers, Partners, ResourceKind};
pub use template::QueryTemplate;
