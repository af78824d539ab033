use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use tracing::debug;

use campus_types::api::{NotificationsResponse, UnreadCountResponse};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};
use crate::views::notification_view;

/// GET /notifications: every notification, then all of them marked read.
pub async fn notifications(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let (rows, marked_read) = run_db(&state, move |db| Ok(db.take_notifications(user_id)?)).await?;

    debug!("{} viewed {} notifications ({} newly read)", me.username, rows.len(), marked_read);
    Ok(Json(NotificationsResponse {
        notifications: rows.into_iter().map(notification_view).collect(),
        marked_read,
    }))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let unread = run_db(&state, move |db| Ok(db.unread_count(user_id)?)).await?;
    Ok(Json(UnreadCountResponse { unread }))
}
