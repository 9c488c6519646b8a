use axum::{
    Form, Json,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::Principal;
use crate::services::AuthError;

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginStatus {
    pub authenticated: bool,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid login".to_string()),
            AuthError::UserNotFound => Self::not_found("User", "requested"),
            AuthError::DuplicateEmail => Self::Conflict(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) | AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Available on routes behind [`auth_middleware`].
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session to an active user and stores the [`Principal`] in the
/// request extensions. Sessions of disabled or deleted users are flushed.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = session_principal(&state, &session)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    tracing::Span::current().record("user_id", principal.id);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Must run inside [`auth_middleware`].
pub async fn admin_middleware(
    principal: Principal,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    if session_principal(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Json(ApiResponse::success(LoginStatus {
        authenticated: false,
    }))
    .into_response())
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    let principal = match state
        .auth_service()
        .login(&form.email, &form.password)
        .await
    {
        Ok(principal) => principal,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(event = "login_failed", "Invalid login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to cycle session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, principal.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = principal.id, "User logged in");
    Ok(Redirect::to("/"))
}

/// GET /logout
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session: {e}");
    }
    Redirect::to("/login")
}

// ============================================================================
// Helpers
// ============================================================================

async fn session_principal(
    state: &AppState,
    session: &Session,
) -> Result<Option<Principal>, ApiError> {
    let Some(user_id) = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Ok(None);
    };

    let principal = state.auth_service().principal_for(user_id).await?;
    if principal.is_none() {
        session
            .flush()
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    }

    Ok(principal)
}
