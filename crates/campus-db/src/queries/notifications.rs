use anyhow::Result;
use campus_types::models::NotificationKind;
use rusqlite::Row;

use crate::models::{
    NotificationRow, count_column, optional_user_ref_at, parse_column, timestamp_column,
};
use crate::{Database, now_timestamp};

impl Database {
    /// The one place notification rows are created. Follow, answer and
    /// message side effects all come through here.
    pub fn send_notification(
        &self,
        recipient_id: i64,
        sender_id: Option<i64>,
        kind: NotificationKind,
        message: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (recipient_id, sender_id, kind, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (recipient_id, sender_id, kind.as_str(), message, now_timestamp()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All notifications for `recipient_id`, newest first, as stored.
    pub fn list_notifications(&self, recipient_id: i64) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT n.id, n.recipient_id, n.kind, n.message, n.is_read, n.created_at,
                        u.id, u.username, u.role, u.college, u.avatar
                 FROM notifications n
                 LEFT JOIN users u ON u.id = n.sender_id
                 WHERE n.recipient_id = ?1
                 ORDER BY n.created_at DESC, n.id DESC",
            )?;
            let rows = stmt
                .query_map([recipient_id], map_notification)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// List notifications, then mark the listed ones read. Rows come back
    /// in their pre-read state. Returns the rows and how many were flipped.
    pub fn take_notifications(&self, recipient_id: i64) -> Result<(Vec<NotificationRow>, u64)> {
        let rows = self.list_notifications(recipient_id)?;
        let Some(newest) = rows.iter().map(|n| n.id).max() else {
            return Ok((rows, 0));
        };

        let marked = self.with_conn(|conn| {
            // Bounded by id so a notification arriving mid-view stays unread.
            let marked = conn.execute(
                "UPDATE notifications SET is_read = 1
                 WHERE recipient_id = ?1 AND is_read = 0 AND id <= ?2",
                [recipient_id, newest],
            )?;
            Ok(marked)
        })?;

        Ok((rows, u64::try_from(marked)?))
    }

    pub fn unread_count(&self, recipient_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
                [recipient_id],
                |row| count_column(row, 0),
            )?;
            Ok(count)
        })
    }
}

fn map_notification(row: &Row) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        kind: parse_column(row, 2)?,
        message: row.get(3)?,
        is_read: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
        sender: optional_user_ref_at(row, 6)?,
    })
}
