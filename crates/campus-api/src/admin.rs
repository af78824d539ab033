use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use tracing::{info, warn};

use campus_db::Database;
use campus_db::models::NewUser;
use campus_types::fixtures::Fixture;

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};

/// GET /
pub async fn home() -> Redirect {
    Redirect::to("/explore")
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /migrate-now: apply pending schema migrations, then go home.
pub async fn migrate_now(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Redirect, ApiError> {
    let applied = run_db(&state, |db| Ok(db.migrate()?)).await?;
    info!("{} triggered migrations ({} applied)", me.username, applied);
    Ok(Redirect::to("/"))
}

/// GET /load-data: seed from the configured fixture file, then go home.
pub async fn load_data(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Redirect, ApiError> {
    let Some(path) = state.fixture_path.clone() else {
        info!("{} requested load-data but no fixture is configured", me.username);
        return Ok(Redirect::to("/"));
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fixture {}", path.display()))?;

    let report = run_db(&state, move |db| Ok(seed_fixture(db, &fixture)?)).await?;
    info!(
        "Fixture {} loaded by {}: {} users ({} already present), {} queries, {} posts",
        path.display(),
        me.username,
        report.users,
        report.skipped_users,
        report.queries,
        report.posts
    );
    Ok(Redirect::to("/"))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub skipped_users: usize,
    pub queries: usize,
    pub posts: usize,
}

/// Insert fixture content. Users that already exist are skipped, and only
/// users created by this run get the fixture's queries and posts, so loading
/// the same file twice adds nothing the second time.
pub fn seed_fixture(db: &Database, fixture: &Fixture) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut created: HashMap<&str, i64> = HashMap::new();

    for user in &fixture.users {
        if db.get_user_by_username(&user.username)?.is_some() {
            report.skipped_users += 1;
            continue;
        }
        let password_hash = hash_password(&user.password)?;
        let inserted = db.create_user_unless_taken(&NewUser {
            username: &user.username,
            email: &user.email,
            password_hash: &password_hash,
            role: user.role,
            college: &user.college,
        })?;
        match inserted {
            Some(id) => {
                created.insert(user.username.as_str(), id);
                report.users += 1;
            }
            None => report.skipped_users += 1,
        }
    }

    for query in &fixture.queries {
        match created.get(query.author.as_str()) {
            Some(&author_id) => {
                db.create_query(author_id, &query.title, &query.body, query.is_anonymous)?;
                report.queries += 1;
            }
            None => warn!(
                "Fixture query '{}' skipped: author {} not created by this load",
                query.title, query.author
            ),
        }
    }

    for post in &fixture.posts {
        match created.get(post.author.as_str()) {
            Some(&author_id) => {
                db.create_post(author_id, &post.title, &post.body)?;
                report.posts += 1;
            }
            None => warn!(
                "Fixture post '{}' skipped: author {} not created by this load",
                post.title, post.author
            ),
        }
    }

    Ok(report)
}
