use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::domain::time::now_timestamp;
use crate::entities::{prelude::*, qr_codes, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// Result of asserting the configured administrator at startup.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapOutcome {
    pub admin_id: i32,
    pub created: bool,
    pub backfilled: u64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_active_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query active user by ID")
    }

    /// `email` must already be normalized.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Users::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Returns the active user when the password matches.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<users::Model>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then_some(user))
    }

    pub async fn create(
        &self,
        name: Option<String>,
        email: &str,
        password: &str,
        role: Role,
        security: &SecurityConfig,
    ) -> Result<users::Model> {
        let password_hash = hash_password_blocking(password, security).await?;

        let active = users::ActiveModel {
            name: Set(name),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model)
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<users::Model>> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user status")?;

        Ok(Some(model))
    }

    /// Upserts the configured administrator and hands every ownerless code
    /// to it, in one transaction.
    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<BootstrapOutcome> {
        let password_hash = hash_password_blocking(password, security).await?;

        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open bootstrap transaction")?;

        let existing = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&txn)
            .await
            .context("Failed to look up bootstrap admin")?;

        let created = existing.is_none();
        let admin = match existing {
            Some(user) => {
                let mut active: users::ActiveModel = user.into();
                active.password_hash = Set(password_hash);
                active.role = Set(Role::Admin.as_str().to_string());
                active.is_active = Set(true);
                active
                    .update(&txn)
                    .await
                    .context("Failed to update bootstrap admin")?
            }
            None => users::ActiveModel {
                name: Set(Some(name.to_string())),
                email: Set(email.to_string()),
                password_hash: Set(password_hash),
                role: Set(Role::Admin.as_str().to_string()),
                is_active: Set(true),
                created_at: Set(now_timestamp()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to insert bootstrap admin")?,
        };

        let backfill = QrCodes::update_many()
            .col_expr(qr_codes::Column::OwnerUserId, Expr::value(admin.id))
            .filter(qr_codes::Column::OwnerUserId.is_null())
            .exec(&txn)
            .await
            .context("Failed to backfill QR code owners")?;

        txn.commit()
            .await
            .context("Failed to commit bootstrap transaction")?;

        Ok(BootstrapOutcome {
            admin_id: admin.id,
            created,
            backfilled: backfill.rows_affected,
        })
    }
}

async fn hash_password_blocking(password: &str, security: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let security = security.clone();
    task::spawn_blocking(move || hash_password(&password, Some(&security)))
        .await
        .context("Password hashing task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_verifies_with_default_verifier() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let hash = hash_password("correct horse", Some(&config)).unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong horse", &parsed)
                .is_err()
        );
    }
}
