use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Numbered schema steps. A step is applied once, in order, inside its own
/// transaction, and recorded in `schema_version`.
const MIGRATIONS: &[(i64, &str, &str)] = &[(1, "initial schema", V1_INITIAL)];

const V1_INITIAL: &str = "
    CREATE TABLE users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT NOT NULL UNIQUE,
        email       TEXT NOT NULL,
        password    TEXT NOT NULL,
        role        TEXT NOT NULL CHECK (role IN ('Junior', 'Senior', 'Doctor')),
        college     TEXT NOT NULL DEFAULT '',
        avatar      TEXT NOT NULL DEFAULT 'avatars/default.png',
        created_at  TEXT NOT NULL
    );

    CREATE TABLE follows (
        follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        followee_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at  TEXT NOT NULL,
        PRIMARY KEY (follower_id, followee_id)
    );

    CREATE INDEX idx_follows_followee ON follows(followee_id);

    CREATE TABLE queries (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        title        TEXT NOT NULL,
        body         TEXT NOT NULL,
        author_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        is_anonymous INTEGER NOT NULL DEFAULT 0,
        created_at   TEXT NOT NULL
    );

    CREATE INDEX idx_queries_author ON queries(author_id, created_at);

    CREATE TABLE answers (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        query_id    INTEGER NOT NULL REFERENCES queries(id) ON DELETE CASCADE,
        author_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        body        TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );

    CREATE INDEX idx_answers_query ON answers(query_id, created_at);

    CREATE TABLE messages (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        sender_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        receiver_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content     TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );

    CREATE INDEX idx_messages_pair ON messages(sender_id, receiver_id, created_at);
    CREATE INDEX idx_messages_receiver ON messages(receiver_id, created_at);

    CREATE TABLE notifications (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        sender_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
        kind         TEXT NOT NULL CHECK (kind IN ('answer', 'follow', 'message')),
        message      TEXT NOT NULL,
        is_read      INTEGER NOT NULL DEFAULT 0,
        created_at   TEXT NOT NULL
    );

    CREATE INDEX idx_notifications_recipient ON notifications(recipient_id, is_read);

    CREATE TABLE posts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        body        TEXT NOT NULL,
        author_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at  TEXT NOT NULL
    );

    CREATE INDEX idx_posts_created ON posts(created_at);
";

pub fn run(conn: &mut Connection) -> Result<usize> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let current = current_version(conn)?;
    let mut applied = 0;

    for &(version, name, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }

        info!("Running migration v{} ({})", version, name);
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        applied += 1;
    }

    if applied > 0 {
        info!("Database migrations complete ({} applied)", applied);
    }
    Ok(applied)
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
