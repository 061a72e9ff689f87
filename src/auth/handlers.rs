use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name must not be empty"));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, payload.name.trim(), &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    // Issue a fresh pair
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("dev@example.com"));
        assert!(!is_valid_email("dev@example"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "dev@example.com".into(),
            name: "Dev".into(),
            password_hash: "secret-hash".into(),
            created_at: time::macros::datetime!(2025-03-10 12:00:00 UTC),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("dev@example.com"));
        assert!(!json.contains("secret-hash"));
    }
}
