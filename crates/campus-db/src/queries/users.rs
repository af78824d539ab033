use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{
    NewUser, USER_REF_COLUMNS, UserRef, UserRow, parse_column, timestamp_column, user_ref_at,
};
use crate::queries::like_pattern;
use crate::{Database, now_timestamp};

const USER_COLUMNS: &str = "id, username, email, password, role, college, avatar, created_at";

impl Database {
    /// Insert a new account and return its id.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, role, college, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    user.username,
                    user.email,
                    user.password_hash,
                    user.role.as_str(),
                    user.college,
                    now_timestamp(),
                ),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Insert a new account unless the username is already taken, in one
    /// statement. Returns `None` when another row holds the name, so
    /// concurrent registrations of one name cannot both succeed.
    pub fn create_user_unless_taken(&self, user: &NewUser<'_>) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, email, password, role, college, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (username) DO NOTHING",
                (
                    user.username,
                    user.email,
                    user.password_hash,
                    user.role.as_str(),
                    user.college,
                    now_timestamp(),
                ),
            )?;
            Ok((inserted > 0).then(|| conn.last_insert_rowid()))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// Every user except `user_id`, ordered by username.
    pub fn list_users_except(&self, user_id: i64) -> Result<Vec<UserRef>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_REF_COLUMNS} FROM users u WHERE u.id != ?1 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], |row| user_ref_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring match on username or college.
    pub fn search_users(&self, term: &str) -> Result<Vec<UserRef>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_REF_COLUMNS} FROM users u
                 WHERE u.username LIKE ?1 ESCAPE '\\' OR u.college LIKE ?1 ESCAPE '\\'
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([like_pattern(term)], |row| user_ref_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    param: impl rusqlite::ToSql,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([param], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: parse_column(row, 4)?,
        college: row.get(5)?,
        avatar: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
    })
}
