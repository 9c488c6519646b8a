use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod dashboard;
mod error;
mod observability;
mod qr;
mod redirect;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{AuthService, QrService, RedirectService, StatsService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<Config> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn qr_service(&self) -> &Arc<dyn QrService> {
        &self.shared.qr_service
    }

    #[must_use]
    pub fn redirect_service(&self) -> &RedirectService {
        &self.shared.redirect_service
    }

    #[must_use]
    pub fn stats_service(&self) -> &StatsService {
        &self.shared.stats_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

/// Opens the store, runs the admin bootstrap and builds the state.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    shared.bootstrap().await?;
    Ok(create_app_state(shared, prometheus_handle))
}

fn session_key(secret: &str) -> Key {
    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!(
                "Session secret missing or shorter than 64 bytes; using a random key (sessions reset on restart)"
            );
            Key::generate()
        }
    }
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().server.clone();

    let session_store = SqliteStore::new(state.store().sqlite_pool().clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
        .with_signed(session_key(&server.session_secret));

    let protected_routes = create_protected_router(state.clone());
    let admin_routes = create_admin_router(state.clone());

    Ok(Router::new()
        .merge(protected_routes)
        .merge(admin_routes)
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/r/{code}", get(redirect::resolve))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .layer(session_layer)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware)))
}

// `{id}` is the numeric id everywhere except `/png`, where it carries the code.
fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/qr/new", post(qr::create_qr))
        .route("/qr/{id}/edit", get(qr::get_qr).post(qr::update_qr))
        .route("/qr/{id}/stats", get(qr::get_stats))
        .route("/qr/{id}/png", get(qr::get_png))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/admin/users/{id}/active", post(admin::set_user_active))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
