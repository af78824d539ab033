use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{NotificationKind, Role};

// -- Token Claims --

/// Token claims shared by the login handlers and the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Accounts --
//
// Form bodies default every missing field to empty, so validation reports
// it as a required-field error instead of the body being rejected whole.

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    /// Kept as text so an unknown role surfaces as a field error.
    pub role: String,
    pub college: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AccountView,
    pub token: String,
}

/// Public face of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub college: String,
    pub avatar: String,
}

/// What a user sees about their own account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub college: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

// -- Profiles --

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: AccountView,
    pub queries: Vec<QueryView>,
    pub following_count: u64,
    pub followers_count: u64,
    pub unread_notifications: u64,
}

#[derive(Debug, Serialize)]
pub struct UserListEntry {
    pub user: UserSummary,
    pub is_following: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub tab: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserSummary,
    pub queries: Vec<QueryView>,
    pub answers: Vec<AnswerView>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub is_following: bool,
    pub tab: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub user_id: i64,
    pub following: bool,
    pub followers_count: u64,
}

// -- Queries & answers --

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateQueryRequest {
    pub title: String,
    pub body: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryListParams {
    pub all: Option<String>,
}

impl QueryListParams {
    pub fn showing_all(&self) -> bool {
        self.all.as_deref() == Some("1")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryView {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// `None` when the query is anonymous.
    pub author: Option<UserSummary>,
    pub display_author: String,
    pub is_anonymous: bool,
    pub is_mine: bool,
    pub answer_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryListResponse {
    pub queries: Vec<QueryView>,
    pub showing_all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryDetailResponse {
    pub query: QueryView,
    pub answers: Vec<AnswerView>,
    pub can_answer: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateAnswerRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    pub id: i64,
    pub query_id: i64,
    pub body: String,
    pub author: UserSummary,
    pub is_mine: bool,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub sender_username: String,
    pub content: String,
    pub is_mine: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub other_user: UserSummary,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InboxEntry {
    pub user: UserSummary,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub sender: Option<UserSummary>,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    /// State as it was before this view marked everything read.
    pub notifications: Vec<NotificationView>,
    pub marked_read: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

// -- Explore --

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author: UserSummary,
    pub created_at: DateTime<Utc>,
}

// -- Search --

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub query_results: Vec<QueryView>,
    pub user_results: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_form_fields_deserialize_empty() {
        let req: CreateQueryRequest = serde_json::from_str(r#"{"title": "only a title"}"#).unwrap();
        assert_eq!(req.title, "only a title");
        assert_eq!(req.body, "");
        assert!(!req.is_anonymous);

        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_empty() && req.role.is_empty());
    }

    #[test]
    fn unknown_form_fields_still_rejected() {
        let res = serde_json::from_str::<CreateAnswerRequest>(r#"{"body": "x", "extra": 1}"#);
        assert!(res.is_err());
    }
}
