use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, EditQrForm, NewQrForm, QrCodeDto, StatsDto, StatsQuery};
use crate::domain::Principal;
use crate::entities::qr_codes;
use crate::services::{Granularity, QrError, QrUpdate, qr_image};

impl From<QrError> for ApiError {
    fn from(err: QrError) -> Self {
        match err {
            QrError::NotFound => Self::qr_not_found(),
            QrError::Duplicate(_) => Self::Conflict(err.to_string()),
            QrError::Validation(msg) => Self::validation(msg),
            QrError::Database(msg) | QrError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn to_dto(state: &AppState, qr: qr_codes::Model) -> QrCodeDto {
    let public_url = state.config().public_url(&qr.code);
    QrCodeDto::new(qr, public_url)
}

/// POST /qr/new
pub async fn create_qr(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Form(form): Form<NewQrForm>,
) -> Result<impl IntoResponse, ApiError> {
    let qr = state
        .qr_service()
        .create(&principal, &form.code, &form.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(to_dto(&state, qr))),
    ))
}

/// GET /qr/{id}/edit
pub async fn get_qr(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<QrCodeDto>>, ApiError> {
    let id = validate_id(id)?;
    let qr = state.qr_service().get_for(&principal, id).await?;
    Ok(Json(ApiResponse::success(to_dto(&state, qr))))
}

/// POST /qr/{id}/edit
pub async fn update_qr(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Form(form): Form<EditQrForm>,
) -> Result<Json<ApiResponse<QrCodeDto>>, ApiError> {
    let id = validate_id(id)?;
    let update = QrUpdate {
        current_url: form.current_url,
        description: form.description,
        status: form.status,
    };

    let qr = state.qr_service().update(&principal, id, update).await?;
    Ok(Json(ApiResponse::success(to_dto(&state, qr))))
}

/// GET /qr/{id}/stats?group=day|week|month
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let id = validate_id(id)?;
    let qr = state.qr_service().get_for(&principal, id).await?;
    let granularity = Granularity::parse_or_day(query.group.as_deref());

    let stats = state.stats_service().aggregate(qr.id, granularity).await?;

    Ok(Json(ApiResponse::success(StatsDto::new(
        to_dto(&state, qr),
        stats,
    ))))
}

/// GET /qr/{code}/png
pub async fn get_png(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let qr = state.qr_service().get_by_code_for(&principal, &code).await?;
    let link = state.config().public_url(&qr.code);

    let png = tokio::task::spawn_blocking(move || qr_image::render_png(&link))
        .await
        .map_err(|e| ApiError::internal(format!("QR render task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.png\"", qr.code),
            ),
        ],
        png,
    ))
}
