//! Row → API view conversions. Anything that depends on who is looking
//! (anonymity, `is_mine`) is decided here.

use campus_db::models::{
    AnswerRow, InboxRow, MessageRow, NotificationRow, PostRow, QueryRow, UserRef, UserRow,
};
use campus_types::api::{
    AccountView, AnswerView, InboxEntry, MessageView, NotificationView, PostView, QueryView,
    UserSummary,
};

const ANONYMOUS: &str = "Anonymous";

pub fn user_summary(user: UserRef) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username,
        role: user.role,
        college: user.college,
        avatar: user.avatar,
    }
}

pub fn account_view(user: &UserRow) -> AccountView {
    AccountView {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        college: user.college.clone(),
        avatar: user.avatar.clone(),
        created_at: user.created_at,
    }
}

pub fn query_view(row: QueryRow, viewer_id: i64) -> QueryView {
    let is_mine = row.author.id == viewer_id;
    let (author, display_author) = if row.is_anonymous {
        (None, ANONYMOUS.to_string())
    } else {
        let name = row.author.username.clone();
        (Some(user_summary(row.author)), name)
    };

    QueryView {
        id: row.id,
        title: row.title,
        body: row.body,
        author,
        display_author,
        is_anonymous: row.is_anonymous,
        is_mine,
        answer_count: row.answer_count,
        created_at: row.created_at,
    }
}

pub fn query_views(rows: Vec<QueryRow>, viewer_id: i64) -> Vec<QueryView> {
    rows.into_iter().map(|row| query_view(row, viewer_id)).collect()
}

pub fn answer_view(row: AnswerRow, viewer_id: i64) -> AnswerView {
    AnswerView {
        id: row.id,
        query_id: row.query_id,
        body: row.body,
        is_mine: row.author.id == viewer_id,
        author: user_summary(row.author),
        created_at: row.created_at,
    }
}

pub fn message_view(row: MessageRow, viewer_id: i64) -> MessageView {
    MessageView {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        sender_username: row.sender_username,
        content: row.content,
        is_mine: row.sender_id == viewer_id,
        timestamp: row.created_at,
    }
}

pub fn inbox_entry(row: InboxRow) -> InboxEntry {
    InboxEntry {
        user: user_summary(row.partner),
        last_message: row.last_message,
        timestamp: row.created_at,
    }
}

pub fn notification_view(row: NotificationRow) -> NotificationView {
    NotificationView {
        id: row.id,
        kind: row.kind,
        message: row.message,
        sender: row.sender.map(user_summary),
        is_read: row.is_read,
        timestamp: row.created_at,
    }
}

pub fn post_view(row: PostRow) -> PostView {
    PostView {
        id: row.id,
        title: row.title,
        body: row.body,
        author: user_summary(row.author),
        created_at: row.created_at,
    }
}
