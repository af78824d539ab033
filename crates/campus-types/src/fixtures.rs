//! Seed data format accepted by the `/load-data` route.
//!
//! ```json
//! {
//!   "users": [{ "username": "amira", "email": "amira@uni.edu", "password": "...",
//!               "role": "Senior", "college": "Medicine" }],
//!   "queries": [{ "author": "amira", "title": "...", "body": "...", "is_anonymous": false }],
//!   "posts": [{ "author": "amira", "title": "...", "body": "..." }]
//! }
//! ```

use serde::Deserialize;

use crate::models::Role;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub queries: Vec<FixtureQuery>,
    #[serde(default)]
    pub posts: Vec<FixturePost>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub college: String,
}

/// Authors are referenced by username.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureQuery {
    pub author: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturePost {
    pub author: String,
    pub title: String,
    pub body: String,
}
