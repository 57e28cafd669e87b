use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, password};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<AuthResponse>), ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    if name.is_empty() || email.is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required".to_string(),
        ));
    }

    if User::find_by_email(&state.db().conn, email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = User::create(
        &state.db().conn,
        &CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        },
        Uuid::new_v4(),
    )
    .await?;

    tracing::info!(user_id = %user.id, "registered user");

    let token = state.jwt().generate_token(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<AuthResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db().conn, payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.jwt().generate_token(user.id)?;
    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

pub async fn get_profile(Extension(user): Extension<User>) -> ResponseJson<ProfileResponse> {
    Json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

/// Registration and login sit outside the auth middleware.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/users/profile", get(get_profile))
}
