//! Domain service for QR code management.
//!
//! Every operation takes the acting [`Principal`]; codes the principal may not
//! access are reported as [`QrError::NotFound`].

use serde::Serialize;
use thiserror::Error;

use crate::domain::Principal;
use crate::entities::qr_codes;

/// Errors specific to QR code operations.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR code not found")]
    NotFound,

    #[error("QR code '{0}' already exists")]
    Duplicate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for QrError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for QrError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Raw edit form values; validated by the service.
#[derive(Debug, Clone, Default)]
pub struct QrUpdate {
    pub current_url: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct DashboardEntry {
    pub qr: qr_codes::Model,
    pub owner: Option<OwnerSummary>,
    pub scans: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardListing {
    pub scope_label: &'static str,
    pub entries: Vec<DashboardEntry>,
}

/// Domain service trait for QR codes.
#[async_trait::async_trait]
pub trait QrService: Send + Sync {
    /// Creates an active code with no destination, owned by `principal`.
    ///
    /// # Errors
    ///
    /// - [`QrError::Validation`] if the code is blank or malformed
    /// - [`QrError::Duplicate`] if the code is already taken
    async fn create(
        &self,
        principal: &Principal,
        code: &str,
        description: &str,
    ) -> Result<qr_codes::Model, QrError>;

    /// Dashboard rows, newest first. Admins see every code with its owner.
    async fn list_for(&self, principal: &Principal) -> Result<DashboardListing, QrError>;

    async fn get_for(&self, principal: &Principal, id: i32) -> Result<qr_codes::Model, QrError>;

    async fn get_by_code_for(
        &self,
        principal: &Principal,
        code: &str,
    ) -> Result<qr_codes::Model, QrError>;

    /// Replaces destination, description and status of a code.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Validation`] for a non-http(s) URL or an unknown
    /// status; the stored row is left untouched in that case.
    async fn update(
        &self,
        principal: &Principal,
        id: i32,
        update: QrUpdate,
    ) -> Result<qr_codes::Model, QrError>;
}
