use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};

use campus_db::models::UserRow;
use campus_types::api::Claims;
use campus_types::models::Role;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "campus_session";

/// The authenticated requester, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub college: String,
}

impl From<UserRow> for CurrentUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            role: row.role,
            college: row.college,
        }
    }
}

/// Accept a token from the Authorization header or the session cookie,
/// validate it, and load the account it names.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .or_else(|| {
            CookieJar::from_headers(req.headers())
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
        })
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.jwt_secret, &token).ok_or(ApiError::Unauthorized)?;

    // The account may have been removed since the token was issued.
    let user = run_db(&state, move |db| Ok(db.get_user_by_id(claims.sub)?))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub(crate) fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
