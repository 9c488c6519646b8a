//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{BootstrapConfig, SecurityConfig};
use crate::db::{BootstrapOutcome, Store, User};
use crate::domain::validation::normalize_email;
use crate::domain::{Principal, Role};
use crate::services::auth_service::{AuthError, AuthService, NewUser};
use crate::services::is_unique_violation;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .verify_user_password(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(Principal::from(user))
    }

    async fn principal_for(&self, user_id: i32) -> Result<Option<Principal>, AuthError> {
        let user = self.store.get_active_user(user_id).await?;
        Ok(user.map(Principal::from))
    }

    async fn bootstrap_admin(
        &self,
        config: &BootstrapConfig,
    ) -> Result<Option<BootstrapOutcome>, AuthError> {
        if !config.is_configured() {
            warn!("No bootstrap admin configured (ADMIN_EMAIL / ADMIN_PASSWORD)");
            return Ok(None);
        }

        let email = normalize_email(&config.admin_email);
        let name = if config.admin_name.trim().is_empty() {
            "Admin"
        } else {
            config.admin_name.trim()
        };

        let outcome = self
            .store
            .bootstrap_admin(name, &email, &config.admin_password, &self.security)
            .await?;

        info!(
            admin_id = outcome.admin_id,
            created = outcome.created,
            backfilled = outcome.backfilled,
            "Bootstrap admin ensured"
        );

        Ok(Some(outcome))
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users().await?)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let email = normalize_email(&new_user.email);
        if email.is_empty() || new_user.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let name = Some(new_user.name.trim().to_string()).filter(|n| !n.is_empty());
        let role = Role::parse_or_user(&new_user.role);

        let user = self
            .store
            .create_user(name, &email, &new_user.password, role, &self.security)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::DuplicateEmail
                } else {
                    AuthError::from(e)
                }
            })?;

        info!(user_id = user.id, role = %role, "User created");
        Ok(User::from(user))
    }

    async fn set_user_active(
        &self,
        actor: &Principal,
        user_id: i32,
        is_active: bool,
    ) -> Result<User, AuthError> {
        if actor.id == user_id && !is_active {
            return Err(AuthError::Validation(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let user = self
            .store
            .set_user_active(user_id, is_active)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id, is_active, actor = actor.id, "User status changed");
        Ok(User::from(user))
    }
}
