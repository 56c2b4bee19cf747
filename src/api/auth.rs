use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::validate_required;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{
    AuthError, RouteDecision, SessionUser, UserProfile, auth_service::decide_route,
};

/// Session key holding the [`SessionUser`] claims.
pub const SESSION_USER_KEY: &str = "user";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session user and applies the route guard. On success the
/// claims are available to handlers as `Extension<SessionUser>`.
///
/// Claims are reloaded from the database on every request; a session whose
/// user was deleted or deactivated is flushed.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match session_user(&session).await? {
        Some(cached) => Some(refresh_claims(&state, &session, cached).await?),
        None => None,
    };

    match decide_route(user.as_ref(), request.uri().path()) {
        RouteDecision::Allow => {}
        RouteDecision::RequireLogin => return Err(ApiError::unauthenticated()),
        RouteDecision::Forbidden => return Err(ApiError::forbidden()),
        RouteDecision::RequirePasswordChange => return Err(ApiError::PasswordChangeRequired),
    }

    let Some(user) = user else {
        return Err(ApiError::unauthenticated());
    };

    tracing::Span::current().record("user_id", user.user_id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    let phone = validate_required(&payload.phone, "מספר טלפון")?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("סיסמה היא שדה חובה"));
    }

    let user = state.shared.auth_service.login(phone, &payload.password).await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    store_session_user(&session, &user).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new("התנתקת מהמערכת"))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.shared.auth_service.profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /auth/password
///
/// Refreshes the session claims so a forced change unlocks the rest of the
/// API immediately.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    let updated = state
        .shared
        .auth_service
        .change_password(user.user_id, &payload.current_password, &payload.new_password)
        .await?;

    store_session_user(&session, &updated).await?;

    tracing::info!(user_id = updated.user_id, "Password changed");

    Ok(Json(ApiResponse::success(updated)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn session_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

async fn refresh_claims(
    state: &AppState,
    session: &Session,
    cached: SessionUser,
) -> Result<SessionUser, ApiError> {
    match state.shared.auth_service.current_claims(cached.user_id).await {
        Ok(fresh) => {
            if fresh != cached {
                store_session_user(session, &fresh).await?;
            }
            Ok(fresh)
        }
        Err(AuthError::UserNotFound | AuthError::AccountDisabled) => {
            tracing::info!(user_id = cached.user_id, "Session revoked for missing or inactive user");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Failed to flush revoked session");
            }
            Err(ApiError::unauthenticated())
        }
        Err(e) => Err(e.into()),
    }
}

async fn store_session_user(session: &Session, user: &SessionUser) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}
