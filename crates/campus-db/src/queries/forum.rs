use anyhow::Result;
use rusqlite::{OptionalExtension, Row, ToSql};

use crate::models::{
    AnswerRow, QueryRow, USER_REF_COLUMNS, count_column, timestamp_column, user_ref_at,
};
use crate::queries::like_pattern;
use crate::{Database, now_timestamp};

/// Which queries a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every query.
    All,
    /// Queries whose author belongs to this college.
    College(String),
    /// Everything written by one author, anonymous queries included.
    Author(i64),
    /// One author's queries as other users see them: anonymous ones left out.
    AuthorPublic(i64),
}

const QUERY_SELECT: &str = "
    SELECT q.id, q.title, q.body, q.is_anonymous, q.created_at,
           (SELECT COUNT(*) FROM answers a WHERE a.query_id = q.id),
           u.id, u.username, u.role, u.college, u.avatar
    FROM queries q
    JOIN users u ON u.id = q.author_id";

impl Database {
    // -- Queries --

    pub fn create_query(
        &self,
        author_id: i64,
        title: &str,
        body: &str,
        is_anonymous: bool,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO queries (title, body, author_id, is_anonymous, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (title, body, author_id, is_anonymous, now_timestamp()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_query(&self, id: i64) -> Result<Option<QueryRow>> {
        self.with_conn(|conn| {
            let sql = format!("{QUERY_SELECT} WHERE q.id = ?1");
            let row = conn.query_row(&sql, [id], map_query).optional()?;
            Ok(row)
        })
    }

    /// Queries in `scope`, newest first.
    pub fn list_queries(&self, scope: &QueryScope) -> Result<Vec<QueryRow>> {
        let (predicate, param): (&str, Option<&dyn ToSql>) = match scope {
            QueryScope::All => ("1 = 1", None),
            QueryScope::College(college) => ("u.college = ?1", Some(college as &dyn ToSql)),
            QueryScope::Author(author_id) => ("q.author_id = ?1", Some(author_id as &dyn ToSql)),
            QueryScope::AuthorPublic(author_id) => {
                ("q.author_id = ?1 AND q.is_anonymous = 0", Some(author_id as &dyn ToSql))
            }
        };

        self.with_conn(|conn| {
            let sql = format!(
                "{QUERY_SELECT} WHERE {predicate} ORDER BY q.created_at DESC, q.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> = param.into_iter().collect();
            let rows = stmt
                .query_map(params.as_slice(), map_query)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring match on title or body, newest first.
    pub fn search_queries(&self, term: &str) -> Result<Vec<QueryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{QUERY_SELECT}
                 WHERE q.title LIKE ?1 ESCAPE '\\' OR q.body LIKE ?1 ESCAPE '\\'
                 ORDER BY q.created_at DESC, q.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([like_pattern(term)], map_query)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes the query and, through the foreign key, its answers.
    pub fn delete_query(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM queries WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    // -- Answers --

    pub fn create_answer(&self, query_id: i64, author_id: i64, body: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO answers (query_id, author_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
                (query_id, author_id, body, now_timestamp()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_answer(&self, id: i64) -> Result<Option<AnswerRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT a.id, a.query_id, a.body, a.created_at, {USER_REF_COLUMNS}
                 FROM answers a JOIN users u ON u.id = a.author_id
                 WHERE a.id = ?1"
            );
            let row = conn.query_row(&sql, [id], map_answer).optional()?;
            Ok(row)
        })
    }

    /// Answers to one query, newest first.
    pub fn list_answers_for_query(&self, query_id: i64) -> Result<Vec<AnswerRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT a.id, a.query_id, a.body, a.created_at, {USER_REF_COLUMNS}
                 FROM answers a JOIN users u ON u.id = a.author_id
                 WHERE a.query_id = ?1
                 ORDER BY a.created_at DESC, a.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([query_id], map_answer)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Answers written by one user, newest first.
    pub fn list_answers_by_author(&self, author_id: i64) -> Result<Vec<AnswerRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT a.id, a.query_id, a.body, a.created_at, {USER_REF_COLUMNS}
                 FROM answers a JOIN users u ON u.id = a.author_id
                 WHERE a.author_id = ?1
                 ORDER BY a.created_at DESC, a.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([author_id], map_answer)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_answer(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM answers WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}

fn map_query(row: &Row) -> rusqlite::Result<QueryRow> {
    Ok(QueryRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        is_anonymous: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        answer_count: count_column(row, 5)?,
        author: user_ref_at(row, 6)?,
    })
}

fn map_answer(row: &Row) -> rusqlite::Result<AnswerRow> {
    Ok(AnswerRow {
        id: row.get(0)?,
        query_id: row.get(1)?,
        body: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        author: user_ref_at(row, 4)?,
    })
}
