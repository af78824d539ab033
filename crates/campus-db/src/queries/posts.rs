use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use crate::models::{PostRow, USER_REF_COLUMNS, timestamp_column, user_ref_at};
use crate::{Database, now_timestamp};

impl Database {
    pub fn create_post(&self, author_id: i64, title: &str, body: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (title, body, author_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                (title, body, author_id, now_timestamp()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT p.id, p.title, p.body, p.created_at, {USER_REF_COLUMNS}
                 FROM posts p JOIN users u ON u.id = p.author_id
                 WHERE p.id = ?1"
            );
            let row = conn.query_row(&sql, [id], map_post).optional()?;
            Ok(row)
        })
    }

    /// The explore feed: every post, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT p.id, p.title, p.body, p.created_at, {USER_REF_COLUMNS}
                 FROM posts p JOIN users u ON u.id = p.author_id
                 ORDER BY p.created_at DESC, p.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_post(row: &Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        author: user_ref_at(row, 4)?,
    })
}
