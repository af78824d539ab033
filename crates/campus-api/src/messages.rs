use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use tracing::info;

use campus_types::api::{ChatResponse, InboxEntry, SendMessageRequest};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::forms::{FieldErrors, validate_message};
use crate::middleware::CurrentUser;
use crate::notify::{Event, notify};
use crate::state::{AppState, run_db};
use crate::views::{inbox_entry, message_view, user_summary};

/// GET /inbox: latest message per conversation partner, newest first.
pub async fn inbox(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let rows = run_db(&state, move |db| Ok(db.get_inbox(user_id)?)).await?;
    let entries: Vec<InboxEntry> = rows.into_iter().map(inbox_entry).collect();
    Ok(Json(entries))
}

/// GET /chat/{username}
pub async fn chat_view(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let (other, messages) = run_db(&state, move |db| {
        let other = db.get_user_by_username(&username)?.ok_or(ApiError::NotFound("user"))?;
        let messages = db.get_conversation(user_id, other.id)?;
        Ok((other, messages))
    })
    .await?;

    Ok(Json(ChatResponse {
        other_user: user_summary(other.to_ref()),
        messages: messages.into_iter().map(|m| message_view(m, me.id)).collect(),
    }))
}

/// POST /chat/{username}
pub async fn send_message(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(me): Extension<CurrentUser>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = me.clone();
    let message = run_db(&state, move |db| {
        let other = db.get_user_by_username(&username)?.ok_or(ApiError::NotFound("user"))?;
        if other.id == actor.id {
            return Err(FieldErrors::single("receiver", "You cannot message yourself.").into());
        }
        let content = validate_message(&req.content)?;

        let id = db.insert_message(actor.id, other.id, &content)?;
        notify(db, other.id, &actor, Event::Messaged)?;

        db.get_message(id)?.ok_or(ApiError::NotFound("message"))
    })
    .await?;

    info!("Message {} from {} to user {}", message.id, me.username, message.receiver_id);
    Ok((StatusCode::CREATED, Json(message_view(message, me.id))))
}

/// POST /message/{id}/delete: sender only.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = me.id;
    run_db(&state, move |db| {
        let message = db.get_message(message_id)?.ok_or(ApiError::NotFound("message"))?;
        if message.sender_id != requester {
            return Err(ApiError::Forbidden("You can't delete this message."));
        }
        db.delete_message(message_id)?;
        Ok(())
    })
    .await?;

    info!("Message {} deleted by {}", message_id, me.username);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /start-chat/{username}: to the chat, or to the inbox when it is yourself.
pub async fn start_chat(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Redirect, ApiError> {
    let other = run_db(&state, move |db| {
        db.get_user_by_username(&username)?.ok_or(ApiError::NotFound("user"))
    })
    .await?;

    if other.id == me.id {
        return Ok(Redirect::to("/inbox"));
    }
    Ok(Redirect::to(&format!("/chat/{}", other.username)))
}
