use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, DashboardDto, DashboardItemDto};
use crate::domain::Principal;

/// GET /
///
/// Admins get every code with its owner; users only their own.
pub async fn index(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let listing = state.qr_service().list_for(&principal).await?;
    let config = state.config();

    let items = listing
        .entries
        .into_iter()
        .map(|entry| {
            let public_url = config.public_url(&entry.qr.code);
            DashboardItemDto::new(entry, public_url)
        })
        .collect();

    Ok(Json(ApiResponse::success(DashboardDto {
        scope_label: listing.scope_label.to_string(),
        is_admin: principal.is_admin(),
        items,
    })))
}
