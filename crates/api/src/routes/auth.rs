//! Authentication route handlers.
//!
//! Signup and login start a session; the session carries the authenticated
//! identity for all auth-gated routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use tradepost_core::{Email, UserId, Username};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request body. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Client-facing user representation. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

/// Response carrying a message and the affected user.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

/// Response carrying just the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and start a session.
///
/// # Errors
///
/// Returns 400 on validation failure or a duplicate email/username.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.email, &body.username, &body.password)
        .await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;

    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            user: user.into(),
        }),
    ))
}

/// Authenticate and start a session.
///
/// Wrong password and unknown email yield identical 401 responses.
///
/// # Errors
///
/// Returns 401 on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        user: user.into(),
    }))
}

/// End the session.
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    clear_current_user(&session).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

/// Return the current user, re-read from the store.
///
/// # Errors
///
/// Returns 401 if unauthenticated, 404 if the user row is gone.
pub async fn me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .get_user(current.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(MeResponse { user: user.into() }))
}

/// Update username and/or email, re-checking uniqueness.
///
/// The session identity is refreshed so subsequent requests see the new
/// values.
///
/// # Errors
///
/// Returns 400 if a new value is invalid or already taken.
pub async fn update_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .update_profile(
            current.user_id,
            body.email.as_deref(),
            body.username.as_deref(),
        )
        .await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;

    Ok(Json(AuthResponse {
        message: "Profile updated successfully",
        user: user.into(),
    }))
}
