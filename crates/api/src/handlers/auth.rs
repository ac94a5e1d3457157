//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use erasmus_core::audit::{events, ActivityContext};
use erasmus_core::error::CoreError;
use erasmus_db::models::session::CreateSession;
use erasmus_db::models::user::{User, UserResponse};
use erasmus_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use sqlx::PgConnection;
use validator::Validate;

use crate::activity::ActivityLogger;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password fail identically.
pub async fn login(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input.validate()?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| CoreError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    if !user.is_active {
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    let mut tx = state.pool.begin().await?;
    UserRepo::record_login(&mut *tx, user.id).await?;
    let response = create_auth_response(&state, &mut tx, &user, &ctx).await?;
    ActivityLogger::new(Some(user.id), &ctx)
        .subject_entry(&mut tx, &user, events::LOGIN, Map::new())
        .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the session: the presented refresh token is revoked and a new
/// pair is issued. A token loses the race against a concurrent refresh of
/// the same session and is rejected.
pub async fn refresh(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_live(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token".into()))?;

    let mut tx = state.pool.begin().await?;
    if !SessionRepo::revoke(&mut *tx, session.id).await? {
        return Err(CoreError::Unauthorized("Invalid or expired refresh token".into()).into());
    }

    let user = UserRepo::find_by_id(&mut *tx, session.user_id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()))?;
    if !user.is_active {
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    let response = create_auth_response(&state, &mut tx, &user, &ctx).await?;
    tx.commit().await?;
    tracing::debug!(user_id = user.id, "Session refreshed");
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the authenticated user.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    let revoked = SessionRepo::revoke_all_for_user(&mut *tx, auth.user_id).await?;
    if let Some(user) = UserRepo::find_by_id(&mut *tx, auth.user_id).await? {
        ActivityLogger::new(Some(auth.user_id), &ctx)
            .subject_entry(&mut tx, &user, events::LOGOUT, Map::new())
            .await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_response(&state.pool, auth.user_id)
        .await?
        .filter(|u| u.deleted_at.is_none())
        .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()))?;
    Ok(Json(DataResponse::new(user)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access and refresh token pair and persist the session.
async fn create_auth_response(
    state: &AppState,
    conn: &mut PgConnection,
    user: &User,
    ctx: &ActivityContext,
) -> AppResult<AuthResponse> {
    let profile = UserRepo::find_response(&mut *conn, user.id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()))?;

    let access_token = generate_access_token(user.id, &profile.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::open(
        &mut *conn,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
            user_agent: ctx.user_agent.clone(),
            ip_address: ctx.ip_address.clone(),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: profile,
    })
}
