use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::info;

use campus_db::QueryScope;
use campus_types::api::{
    DashboardResponse, FollowResponse, ProfileParams, ProfileResponse, UserListEntry,
};

use crate::error::ApiError;
use crate::forms::FieldErrors;
use crate::middleware::CurrentUser;
use crate::notify::{Event, notify};
use crate::state::{AppState, run_db};
use crate::views::{account_view, answer_view, query_views, user_summary};

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let (user, queries, following_count, followers_count, unread) = run_db(&state, move |db| {
        let user = db.get_user_by_id(user_id)?.ok_or(ApiError::NotFound("user"))?;
        Ok((
            user,
            db.list_queries(&QueryScope::Author(user_id))?,
            db.following_count(user_id)?,
            db.followers_count(user_id)?,
            db.unread_count(user_id)?,
        ))
    })
    .await?;

    Ok(Json(DashboardResponse {
        user: account_view(&user),
        queries: query_views(queries, me.id),
        following_count,
        followers_count,
        unread_notifications: unread,
    }))
}

/// GET /users: everyone but the requester, flagged with follow state.
pub async fn all_users(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = me.id;
    let (users, following) = run_db(&state, move |db| {
        Ok((db.list_users_except(user_id)?, db.following_ids(user_id)?))
    })
    .await?;

    let entries: Vec<UserListEntry> = users
        .into_iter()
        .map(|user| UserListEntry {
            is_following: following.contains(&user.id),
            user: user_summary(user),
        })
        .collect();
    Ok(Json(entries))
}

/// GET /profile/{username}
pub async fn user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<ProfileParams>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = me.id;
    let (user, queries, answers, followers, following, is_following) = run_db(&state, move |db| {
        let user = db.get_user_by_username(&username)?.ok_or(ApiError::NotFound("user"))?;
        // Other people never see which anonymous queries are yours.
        let scope = if user.id == viewer {
            QueryScope::Author(user.id)
        } else {
            QueryScope::AuthorPublic(user.id)
        };
        let queries = db.list_queries(&scope)?;
        let answers = db.list_answers_by_author(user.id)?;
        let followers = db.list_followers(user.id)?;
        let following = db.list_following(user.id)?;
        let is_following = db.is_following(viewer, user.id)?;
        Ok((user, queries, answers, followers, following, is_following))
    })
    .await?;

    Ok(Json(ProfileResponse {
        user: user_summary(user.to_ref()),
        queries: query_views(queries, viewer),
        answers: answers.into_iter().map(|a| answer_view(a, viewer)).collect(),
        followers: followers.into_iter().map(user_summary).collect(),
        following: following.into_iter().map(user_summary).collect(),
        is_following,
        tab: params.tab.unwrap_or_else(|| "queries".to_string()),
    }))
}

/// POST /follow/{user_id}: toggle. Only a new follow notifies.
pub async fn follow_user(
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
    Extension(me): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = me.clone();
    let (following, followers_count) = run_db(&state, move |db| {
        let target = db.get_user_by_id(target_id)?.ok_or(ApiError::NotFound("user"))?;
        if target.id == actor.id {
            return Err(FieldErrors::single("user", "You cannot follow yourself.").into());
        }

        let following = db.toggle_follow(actor.id, target.id)?;
        if following {
            notify(db, target.id, &actor, Event::Followed)?;
        }
        Ok((following, db.followers_count(target.id)?))
    })
    .await?;

    info!(
        "{} {} user {}",
        me.username,
        if following { "followed" } else { "unfollowed" },
        target_id
    );

    Ok(Json(FollowResponse {
        user_id: target_id,
        following,
        followers_count,
    }))
}
