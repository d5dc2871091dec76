//! Warehouse-backed listing endpoints.
//!
//! SRP: validate `limit`, run the listing query, shape the rows.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use bidboard_shape::{materialize, render_query, validate_limit, Resource};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::ApiError;

/// Query string of every listing. `limit` is kept raw so the validator sees
/// exactly what the client sent.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
}

/// `GET /api/<listing>?limit=N` for any [`Resource`].
///
/// A query string that does not deserialize (e.g. `limit` given twice) is
/// read as an unparsable limit and falls back to the default.
pub async fn list<R: Resource + 'static>(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<R::Entity>>, ApiError> {
    let request_id = Uuid::new_v4();

    let raw_limit = match query {
        Ok(Query(params)) => params.limit,
        Err(rejection) => {
            warn!(%request_id, resource = R::NAME, error = %rejection, "Unreadable query string, using default limit");
            None
        }
    };

    let limit = validate_limit(raw_limit.as_deref()).map_err(|e| {
        warn!(%request_id, resource = R::NAME, limit = ?raw_limit, "Rejected limit");
        ApiError::from(e)
    })?;

    info!(%request_id, resource = R::NAME, limit = limit.get(), "Listing request");

    let sql = render_query::<R>(&state.table_prefix, limit);
    let rows = state.source.fetch_rows(&sql).await.map_err(|e| {
        error!(
            %request_id,
            resource = R::NAME,
            row_source = state.source.name(),
            error = %e,
            "Listing query failed"
        );
        ApiError::Internal
    })?;

    let row_count = rows.len();
    let entities = materialize::<R>(rows, limit);

    info!(
        %request_id,
        resource = R::NAME,
        rows = row_count,
        entities = entities.len(),
        "Listing served"
    );

    Ok(Json(entities))
}
