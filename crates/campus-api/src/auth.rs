use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use campus_db::models::NewUser;
use campus_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::forms::{FieldErrors, validate_registration};
use crate::middleware::SESSION_COOKIE;
use crate::state::{AppState, run_db};
use crate::views::account_view;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = validate_registration(req)?;

    let user = run_db(&state, move |db| {
        if db.get_user_by_username(&form.username)?.is_some() {
            return Err(username_taken());
        }

        // Concurrent registrations can both pass the check; the insert decides.
        let password_hash = hash_password(&form.password)?;
        let id = db
            .create_user_unless_taken(&NewUser {
                username: &form.username,
                email: &form.email,
                password_hash: &password_hash,
                role: form.role,
                college: &form.college,
            })?
            .ok_or_else(username_taken)?;

        db.get_user_by_id(id)?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("user {} vanished after insert", id))
        })
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username, state.token_ttl_days)?;
    info!("Registered {} ({}, {})", user.username, user.role, user.college);

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token.clone())),
        Json(AuthResponse {
            user: account_view(&user),
            token,
        }),
    ))
}

fn username_taken() -> ApiError {
    FieldErrors::single("username", "A user with that username already exists.").into()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_db(&state, move |db| {
        let user = db
            .get_user_by_username(&req.username)?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password)? {
            warn!("Failed login for {}", user.username);
            return Err(ApiError::InvalidCredentials);
        }
        Ok(user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username, state.token_ttl_days)?;

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(AuthResponse {
            user: account_view(&user),
            token,
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("stored hash unreadable: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn create_token(
    secret: &str,
    user_id: i64,
    username: &str,
    ttl_days: i64,
) -> anyhow::Result<String> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(ttl_days)).timestamp();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: usize::try_from(exp)?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
