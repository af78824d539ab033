//! Database row types. These map directly to SQLite rows and stay
//! independent of the campus-types API views.

use std::str::FromStr;

use campus_types::models::{NotificationKind, Role};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub college: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            college: self.college.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub college: &'a str,
}

/// The public columns of a user, joined onto other rows.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub college: String,
    pub avatar: String,
}

pub struct QueryRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub is_anonymous: bool,
    pub answer_count: u64,
    pub created_at: DateTime<Utc>,
    pub author: UserRef,
}

pub struct AnswerRow {
    pub id: i64,
    pub query_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: UserRef,
}

pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub sender_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Latest message exchanged with one conversation partner.
pub struct InboxRow {
    pub partner: UserRef,
    pub last_message: String,
    pub created_at: DateTime<Utc>,
}

pub struct NotificationRow {
    pub id: i64,
    pub recipient_id: i64,
    pub sender: Option<UserRef>,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: UserRef,
}

// -- Column helpers --

/// Column list matching [`user_ref_at`] for a users table aliased `u`.
pub(crate) const USER_REF_COLUMNS: &str = "u.id, u.username, u.role, u.college, u.avatar";

/// Read the five [`USER_REF_COLUMNS`] starting at `offset`.
pub(crate) fn user_ref_at(row: &Row, offset: usize) -> rusqlite::Result<UserRef> {
    Ok(UserRef {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        role: parse_column(row, offset + 2)?,
        college: row.get(offset + 3)?,
        avatar: row.get(offset + 4)?,
    })
}

/// Like [`user_ref_at`] but for a LEFT JOIN that may have matched nothing.
pub(crate) fn optional_user_ref_at(row: &Row, offset: usize) -> rusqlite::Result<Option<UserRef>> {
    match row.get::<_, Option<i64>>(offset)? {
        Some(_) => user_ref_at(row, offset).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through sqlite3 use datetime('now'): no zone, no fraction.
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn count_column(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let count: i64 = row.get(idx)?;
    u64::try_from(count)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
