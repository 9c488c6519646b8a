use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::QrStatus;
use crate::domain::time::now_timestamp;
use crate::entities::{prelude::*, qr_codes};

/// Editable fields of a code. `code` and owner are fixed at creation.
#[derive(Debug, Clone)]
pub struct QrCodeChanges {
    pub current_url: Option<String>,
    pub description: String,
    pub status: QrStatus,
}

pub struct QrCodeRepository {
    conn: DatabaseConnection,
}

impl QrCodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<qr_codes::Model>> {
        QrCodes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query QR code by ID")
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<qr_codes::Model>> {
        QrCodes::find()
            .filter(qr_codes::Column::Code.eq(code))
            .one(&self.conn)
            .await
            .context("Failed to query QR code by code")
    }

    /// Newest first. `owner` restricts the listing to one user's codes.
    pub async fn list(&self, owner: Option<i32>) -> Result<Vec<qr_codes::Model>> {
        let mut query = QrCodes::find().order_by_desc(qr_codes::Column::Id);

        if let Some(owner_id) = owner {
            query = query.filter(qr_codes::Column::OwnerUserId.eq(owner_id));
        }

        query.all(&self.conn).await.context("Failed to list QR codes")
    }

    /// New codes start active with no destination. A duplicate `code`
    /// surfaces as the driver's unique-constraint error.
    pub async fn insert(
        &self,
        code: &str,
        description: &str,
        owner_id: i32,
    ) -> Result<qr_codes::Model> {
        let now = now_timestamp();

        let active = qr_codes::ActiveModel {
            code: Set(code.to_string()),
            current_url: Set(None),
            status: Set(QrStatus::Active.as_str().to_string()),
            description: Set(Some(description.to_string())),
            owner_user_id: Set(Some(owner_id)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model)
    }

    pub async fn update(
        &self,
        existing: qr_codes::Model,
        changes: QrCodeChanges,
    ) -> Result<qr_codes::Model> {
        let mut active: qr_codes::ActiveModel = existing.into();
        active.current_url = Set(changes.current_url);
        active.description = Set(Some(changes.description));
        active.status = Set(changes.status.as_str().to_string());
        active.updated_at = Set(now_timestamp());

        active
            .update(&self.conn)
            .await
            .context("Failed to update QR code")
    }
}
