use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use campus_types::api::{CreatePostRequest, PostView};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::forms::validate_post;
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};
use crate::views::post_view;

/// GET /explore: public, no college or follow scoping.
pub async fn explore(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, |db| Ok(db.list_posts()?)).await?;
    let posts: Vec<PostView> = rows.into_iter().map(post_view).collect();
    Ok(Json(posts))
}

/// POST /explore/new
pub async fn create_post(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = validate_post(req)?;

    let author_id = me.id;
    let post = run_db(&state, move |db| {
        let id = db.create_post(author_id, &form.title, &form.body)?;
        db.get_post(id)?.ok_or(ApiError::NotFound("post"))
    })
    .await?;

    info!("Post {} published by {}", post.id, me.username);
    Ok((StatusCode::CREATED, Json(post_view(post))))
}
