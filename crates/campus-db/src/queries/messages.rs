use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use crate::models::{InboxRow, MessageRow, timestamp_column, user_ref_at};
use crate::{Database, now_timestamp};

const MESSAGE_SELECT: &str = "
    SELECT m.id, m.sender_id, m.receiver_id, s.username, m.content, m.created_at
    FROM messages m
    JOIN users s ON s.id = m.sender_id";

impl Database {
    pub fn insert_message(&self, sender_id: i64, receiver_id: i64, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                (sender_id, receiver_id, content, now_timestamp()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
            let row = conn.query_row(&sql, [id], map_message).optional()?;
            Ok(row)
        })
    }

    /// Every message exchanged between two users in either direction, oldest first.
    pub fn get_conversation(&self, user_a: i64, user_b: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE (m.sender_id = ?1 AND m.receiver_id = ?2)
                    OR (m.sender_id = ?2 AND m.receiver_id = ?1)
                 ORDER BY m.created_at, m.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_a, user_b], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One row per conversation partner of `user_id`, carrying the latest
    /// message exchanged with them, most recent conversation first.
    pub fn get_inbox(&self, user_id: i64) -> Result<Vec<InboxRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "WITH conv AS (
                     SELECT m.id, m.content, m.created_at,
                            CASE WHEN m.sender_id = ?1 THEN m.receiver_id ELSE m.sender_id END AS partner_id,
                            ROW_NUMBER() OVER (
                                PARTITION BY CASE WHEN m.sender_id = ?1 THEN m.receiver_id ELSE m.sender_id END
                                ORDER BY m.created_at DESC, m.id DESC
                            ) AS rn
                     FROM messages m
                     WHERE m.sender_id = ?1 OR m.receiver_id = ?1
                 )
                 SELECT u.id, u.username, u.role, u.college, u.avatar, conv.content, conv.created_at
                 FROM conv
                 JOIN users u ON u.id = conv.partner_id
                 WHERE conv.rn = 1
                 ORDER BY conv.created_at DESC, conv.id DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(InboxRow {
                        partner: user_ref_at(row, 0)?,
                        last_message: row.get(5)?,
                        created_at: timestamp_column(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}

fn map_message(row: &Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        sender_username: row.get(3)?,
        content: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}
