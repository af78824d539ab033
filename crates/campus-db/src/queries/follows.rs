use std::collections::HashSet;

use anyhow::Result;
use rusqlite::OptionalExtension;

use crate::models::{USER_REF_COLUMNS, UserRef, count_column, user_ref_at};
use crate::{Database, now_timestamp};

impl Database {
    /// Toggle `follower_id` following `followee_id`: removes the edge if it
    /// exists, inserts it if not. Returns true when the edge now exists.
    pub fn toggle_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing = tx
                .query_row(
                    "SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                    [follower_id, followee_id],
                    |_| Ok(()),
                )
                .optional()?;

            let now_following = if existing.is_some() {
                tx.execute(
                    "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                    [follower_id, followee_id],
                )?;
                false
            } else {
                tx.execute(
                    "INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?1, ?2, ?3)",
                    (follower_id, followee_id, now_timestamp()),
                )?;
                true
            };

            tx.commit()?;
            Ok(now_following)
        })
    }

    pub fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                    [follower_id, followee_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn following_count(&self, user_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
                [user_id],
                |row| count_column(row, 0),
            )?;
            Ok(count)
        })
    }

    pub fn followers_count(&self, user_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE followee_id = ?1",
                [user_id],
                |row| count_column(row, 0),
            )?;
            Ok(count)
        })
    }

    /// Users that `user_id` follows.
    pub fn list_following(&self, user_id: i64) -> Result<Vec<UserRef>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_REF_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.followee_id
                 WHERE f.follower_id = ?1
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], |row| user_ref_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Users following `user_id`.
    pub fn list_followers(&self, user_id: i64) -> Result<Vec<UserRef>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_REF_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.follower_id
                 WHERE f.followee_id = ?1
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], |row| user_ref_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn following_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT followee_id FROM follows WHERE follower_id = ?1")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<i64>, _>>()?;
            Ok(ids)
        })
    }
}
