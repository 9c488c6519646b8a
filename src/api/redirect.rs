use axum::{
    extract::{ConnectInfo, FromRequestParts, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, AppState};
use crate::db::AccessRecord;
use crate::services::{Outcome, redirect::client_ip};

/// Visitor metadata for the access log.
pub struct AccessMeta(pub AccessRecord);

fn header_str<'a>(headers: &'a HeaderMap, name: &header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for AccessMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let headers = &parts.headers;
        let forwarded_for = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());

        Ok(Self(AccessRecord {
            ip_address: client_ip(forwarded_for, peer),
            user_agent: header_str(headers, &header::USER_AGENT)
                .unwrap_or_default()
                .to_string(),
            referer: header_str(headers, &header::REFERER)
                .unwrap_or_default()
                .to_string(),
        }))
    }
}

/// GET /r/{code}
///
/// Public. Bodies are plain text; storage failures still map to a JSON 500.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    AccessMeta(record): AccessMeta,
) -> Result<Response, ApiError> {
    let outcome = state.redirect_service().resolve(&code, &record).await?;

    let response = match outcome {
        Outcome::NotFound => (StatusCode::NOT_FOUND, "QR code not found.").into_response(),
        Outcome::Disabled => (StatusCode::GONE, "This QR code is disabled.").into_response(),
        Outcome::NotConfigured => not_configured(),
        Outcome::Redirect(url) => match HeaderValue::try_from(url) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(_) => {
                warn!(code = %code, "Destination is not a valid Location header");
                not_configured()
            }
        },
    };

    Ok(response)
}

fn not_configured() -> Response {
    (
        StatusCode::OK,
        "This destination is not available at the moment.",
    )
        .into_response()
}
