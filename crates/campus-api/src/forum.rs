use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use campus_db::QueryScope;
use campus_types::api::{
    CreateAnswerRequest, CreateQueryRequest, QueryDetailResponse, QueryListParams,
    QueryListResponse,
};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::forms::{validate_answer, validate_query};
use crate::middleware::CurrentUser;
use crate::notify::{Event, notify};
use crate::state::{AppState, run_db};
use crate::views::{answer_view, query_view, query_views};

/// POST /post
pub async fn create_query(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CreateQueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = validate_query(req)?;

    let author_id = me.id;
    let row = run_db(&state, move |db| {
        let id = db.create_query(author_id, &form.title, &form.body, form.is_anonymous)?;
        db.get_query(id)?.ok_or(ApiError::NotFound("query"))
    })
    .await?;

    info!("Query {} created by {} (anonymous: {})", row.id, me.username, row.is_anonymous);
    Ok((StatusCode::CREATED, Json(query_view(row, me.id))))
}

/// GET /queries: same-college queries unless `?all=1`.
pub async fn query_list(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Query(params): Query<QueryListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let showing_all = params.showing_all();
    let scope = if showing_all {
        QueryScope::All
    } else {
        QueryScope::College(me.college.clone())
    };

    let rows = run_db(&state, move |db| Ok(db.list_queries(&scope)?)).await?;

    Ok(Json(QueryListResponse {
        queries: query_views(rows, me.id),
        showing_all,
    }))
}

/// GET /my-queries
pub async fn my_queries(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = me.id;
    let rows =
        run_db(&state, move |db| Ok(db.list_queries(&QueryScope::Author(author_id))?)).await?;
    Ok(Json(query_views(rows, me.id)))
}

/// GET /query/{id}
pub async fn query_detail(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let (query, answers) = run_db(&state, move |db| {
        let query = db.get_query(query_id)?.ok_or(ApiError::NotFound("query"))?;
        let answers = db.list_answers_for_query(query_id)?;
        Ok((query, answers))
    })
    .await?;

    Ok(Json(QueryDetailResponse {
        query: query_view(query, me.id),
        answers: answers.into_iter().map(|a| answer_view(a, me.id)).collect(),
        can_answer: me.role.can_answer(),
    }))
}

/// POST /query/{id} and POST /query/{id}/answer: one answer path for both.
///
/// Only seniors and doctors may answer. The query author is notified unless
/// they answered their own query.
pub async fn post_answer(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CreateAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = me.clone();
    let answer = run_db(&state, move |db| {
        let query = db.get_query(query_id)?.ok_or(ApiError::NotFound("query"))?;

        if !actor.role.can_answer() {
            warn!("{} ({}) tried to answer query {}", actor.username, actor.role, query_id);
            return Err(ApiError::Forbidden("only seniors and doctors can answer queries"));
        }
        let body = validate_answer(&req.body)?;

        let answer_id = db.create_answer(query_id, actor.id, &body)?;
        notify(db, query.author.id, &actor, Event::Answered { query_title: &query.title })?;

        db.get_answer(answer_id)?.ok_or(ApiError::NotFound("answer"))
    })
    .await?;

    info!("Answer {} posted on query {} by {}", answer.id, query_id, me.username);
    Ok((StatusCode::CREATED, Json(answer_view(answer, me.id))))
}

/// POST /query/{id}/delete: author only.
pub async fn delete_query(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = me.id;
    run_db(&state, move |db| {
        let query = db.get_query(query_id)?.ok_or(ApiError::NotFound("query"))?;
        if query.author.id != requester {
            return Err(ApiError::Forbidden("You can only delete your own queries."));
        }
        db.delete_query(query_id)?;
        Ok(())
    })
    .await?;

    info!("Query {} deleted by {}", query_id, me.username);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /answer/{id}/delete: author only.
pub async fn delete_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = me.id;
    run_db(&state, move |db| {
        let answer = db.get_answer(answer_id)?.ok_or(ApiError::NotFound("answer"))?;
        if answer.author.id != requester {
            return Err(ApiError::Forbidden("You can only delete your own answers."));
        }
        db.delete_answer(answer_id)?;
        Ok(())
    })
    .await?;

    info!("Answer {} deleted by {}", answer_id, me.username);
    Ok(StatusCode::NO_CONTENT)
}
