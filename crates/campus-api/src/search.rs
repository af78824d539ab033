use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};

use campus_types::api::{SearchParams, SearchResponse};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};
use crate::views::{query_views, user_summary};

/// GET /search?q=. Substring match on query title/body and on
/// username/college. An empty term matches everything.
pub async fn search(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let term = params.q.trim().to_string();

    let lookup = term.clone();
    let (queries, users) = run_db(&state, move |db| {
        Ok((db.search_queries(&lookup)?, db.search_users(&lookup)?))
    })
    .await?;

    Ok(Json(SearchResponse {
        query: term,
        query_results: query_views(queries, me.id),
        user_results: users.into_iter().map(user_summary).collect(),
    }))
}
