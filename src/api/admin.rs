use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::validation::{parse_flag, validate_id};
use super::{ApiError, ApiResponse, AppState, NewUserForm, UserActiveForm};
use crate::db::User;
use crate::domain::Principal;
use crate::services::NewUser;

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.auth_service().list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth_service()
        .create_user(NewUser {
            name: form.name,
            email: form.email,
            password: form.password,
            role: form.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// POST /admin/users/{id}/active
pub async fn set_user_active(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Form(form): Form<UserActiveForm>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id(id)?;
    let is_active = parse_flag(&form.is_active)?;

    let user = state
        .auth_service()
        .set_user_active(&principal, id, is_active)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}
