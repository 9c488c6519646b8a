pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, NewUser};
pub use auth_service_impl::SeaOrmAuthService;

pub mod qr_service;
pub mod qr_service_impl;
pub use qr_service::{DashboardEntry, DashboardListing, OwnerSummary, QrError, QrService, QrUpdate};
pub use qr_service_impl::SeaOrmQrService;

pub mod redirect;
pub use redirect::{Outcome, RedirectService};

pub mod stats;
pub use stats::{Bucket, Granularity, QrStats, StatsService};

pub mod qr_image;

use sea_orm::{DbErr, SqlErr};

/// True when the error chain bottoms out in a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}
