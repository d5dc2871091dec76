//! HTTP endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared types live here in mod.rs.

mod error;
mod health;
mod listings;

use serde::Serialize;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QueryErrorResponse {
    pub error: String,
}

// ── Re-exports ───────────────────────────────────────────────────
// Keeps flat `api::foo` paths for route registration in router.rs.

pub use error::ApiError;
pub use health::{health, not_found, root};
pub use listings::list;
