pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod forms;
pub mod forum;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod notify;
pub mod posts;
pub mod profiles;
pub mod search;
pub mod state;
pub mod views;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Every route of the service. Transport layers (CORS, tracing) are added
/// by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(admin::home))
        .route("/health", get(admin::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/explore", get(posts::explore));

    let protected_routes = Router::new()
        .route("/dashboard", get(profiles::dashboard))
        .route("/users", get(profiles::all_users))
        .route("/profile/{username}", get(profiles::user_profile))
        .route("/follow/{user_id}", post(profiles::follow_user))
        .route("/post", post(forum::create_query))
        .route("/queries", get(forum::query_list))
        .route("/my-queries", get(forum::my_queries))
        .route("/query/{query_id}", get(forum::query_detail).post(forum::post_answer))
        .route("/query/{query_id}/answer", post(forum::post_answer))
        .route("/query/{query_id}/delete", post(forum::delete_query))
        .route("/answer/{answer_id}/delete", post(forum::delete_answer))
        .route("/inbox", get(messages::inbox))
        .route("/chat/{username}", get(messages::chat_view).post(messages::send_message))
        .route("/message/{message_id}/delete", post(messages::delete_message))
        .route("/start-chat/{username}", get(messages::start_chat))
        .route("/search", get(search::search))
        .route("/explore/new", post(posts::create_post))
        .route("/notifications", get(notifications::notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/migrate-now", get(admin::migrate_now))
        .route("/load-data", get(admin::load_data))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
