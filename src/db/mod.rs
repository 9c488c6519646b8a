use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{qr_access_logs, qr_codes, users};

pub mod migrator;
pub mod repositories;

pub use repositories::access_log::AccessRecord;
pub use repositories::qr_code::QrCodeChanges;
pub use repositories::user::{BootstrapOutcome, User};

/// Storage handle injected into every service. Each call checks a
/// connection out of the pool for its own duration.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if path_str != ":memory:" {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Pool shared with the session store.
    #[must_use]
    pub fn sqlite_pool(&self) -> &sea_orm::sqlx::SqlitePool {
        self.conn.get_sqlite_connection_pool()
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn qr_repo(&self) -> repositories::qr_code::QrCodeRepository {
        repositories::qr_code::QrCodeRepository::new(self.conn.clone())
    }

    fn access_log_repo(&self) -> repositories::access_log::AccessLogRepository {
        repositories::access_log::AccessLogRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_active_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_active_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn create_user(
        &self,
        name: Option<String>,
        email: &str,
        password: &str,
        role: Role,
        security: &SecurityConfig,
    ) -> Result<users::Model> {
        self.user_repo()
            .create(name, email, password, role, security)
            .await
    }

    pub async fn set_user_active(&self, id: i32, is_active: bool) -> Result<Option<users::Model>> {
        self.user_repo().set_active(id, is_active).await
    }

    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<BootstrapOutcome> {
        self.user_repo()
            .bootstrap_admin(name, email, password, security)
            .await
    }

    // QR codes

    pub async fn get_qr_code(&self, id: i32) -> Result<Option<qr_codes::Model>> {
        self.qr_repo().get(id).await
    }

    pub async fn get_qr_code_by_code(&self, code: &str) -> Result<Option<qr_codes::Model>> {
        self.qr_repo().get_by_code(code).await
    }

    pub async fn list_qr_codes(&self, owner: Option<i32>) -> Result<Vec<qr_codes::Model>> {
        self.qr_repo().list(owner).await
    }

    pub async fn insert_qr_code(
        &self,
        code: &str,
        description: &str,
        owner_id: i32,
    ) -> Result<qr_codes::Model> {
        self.qr_repo().insert(code, description, owner_id).await
    }

    pub async fn update_qr_code(
        &self,
        existing: qr_codes::Model,
        changes: QrCodeChanges,
    ) -> Result<qr_codes::Model> {
        self.qr_repo().update(existing, changes).await
    }

    // Access logs

    pub async fn append_access_log(&self, qr_code_id: i32, record: &AccessRecord) -> Result<i64> {
        self.access_log_repo().append(qr_code_id, record).await
    }

    pub async fn append_access_log_at(
        &self,
        qr_code_id: i32,
        accessed_at: &str,
        record: &AccessRecord,
    ) -> Result<i64> {
        self.access_log_repo()
            .append_at(qr_code_id, accessed_at, record)
            .await
    }

    pub async fn count_access_logs(&self, qr_code_id: i32) -> Result<u64> {
        self.access_log_repo().count_for(qr_code_id).await
    }

    pub async fn count_access_logs_for(&self, qr_code_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        self.access_log_repo().counts_for(qr_code_ids).await
    }

    pub async fn recent_access_logs(
        &self,
        qr_code_id: i32,
        limit: u64,
    ) -> Result<Vec<qr_access_logs::Model>> {
        self.access_log_repo().recent_for(qr_code_id, limit).await
    }

    pub async fn access_timestamps_since(&self, qr_code_id: i32, since: &str) -> Result<Vec<String>> {
        self.access_log_repo()
            .timestamps_since(qr_code_id, since)
            .await
    }
}
