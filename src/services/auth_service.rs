//! Domain service for authentication and user management.
//!
//! Handles login, the configured bootstrap administrator and the admin-only
//! user listing/creation endpoints.

use thiserror::Error;

use crate::config::BootstrapConfig;
use crate::db::{BootstrapOutcome, User};
use crate::domain::Principal;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Raw account fields as submitted by an administrator.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials of an active user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for unknown, inactive or
    /// mismatched accounts alike.
    async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Resolves a session's user id to an active principal.
    async fn principal_for(&self, user_id: i32) -> Result<Option<Principal>, AuthError>;

    /// Upserts the configured administrator and assigns ownerless codes to
    /// it. Returns `None` when no administrator is configured.
    async fn bootstrap_admin(
        &self,
        config: &BootstrapConfig,
    ) -> Result<Option<BootstrapOutcome>, AuthError>;

    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a missing email or password and
    /// [`AuthError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Enables or disables an account. Administrators cannot disable
    /// themselves.
    async fn set_user_active(
        &self,
        actor: &Principal,
        user_id: i32,
        is_active: bool,
    ) -> Result<User, AuthError>;
}
