use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;

use crate::domain::time::now_timestamp;
use crate::entities::{prelude::*, qr_access_logs};

/// Request metadata captured for one resolution attempt.
#[derive(Debug, Clone, Default)]
pub struct AccessRecord {
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referer: String,
}

pub struct AccessLogRepository {
    conn: DatabaseConnection,
}

impl AccessLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Autocommitted insert; the row is durable once this returns.
    pub async fn append(&self, qr_code_id: i32, record: &AccessRecord) -> Result<i64> {
        self.append_at(qr_code_id, &now_timestamp(), record).await
    }

    pub async fn count_for(&self, qr_code_id: i32) -> Result<u64> {
        QrAccessLogs::find()
            .filter(qr_access_logs::Column::QrCodeId.eq(qr_code_id))
            .count(&self.conn)
            .await
            .context("Failed to count access logs")
    }

    pub async fn counts_for(&self, qr_code_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if qr_code_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = QrAccessLogs::find()
            .select_only()
            .column(qr_access_logs::Column::QrCodeId)
            .column_as(qr_access_logs::Column::Id.count(), "count")
            .filter(qr_access_logs::Column::QrCodeId.is_in(qr_code_ids.to_vec()))
            .group_by(qr_access_logs::Column::QrCodeId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count access logs per code")?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    /// Newest first.
    pub async fn recent_for(
        &self,
        qr_code_id: i32,
        limit: u64,
    ) -> Result<Vec<qr_access_logs::Model>> {
        QrAccessLogs::find()
            .filter(qr_access_logs::Column::QrCodeId.eq(qr_code_id))
            .order_by_desc(qr_access_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to fetch recent access logs")
    }

    /// Raw `accessed_at` values at or after `since` (lexical comparison on
    /// the fixed-width timestamp format).
    pub async fn timestamps_since(&self, qr_code_id: i32, since: &str) -> Result<Vec<String>> {
        QrAccessLogs::find()
            .select_only()
            .column(qr_access_logs::Column::AccessedAt)
            .filter(qr_access_logs::Column::QrCodeId.eq(qr_code_id))
            .filter(qr_access_logs::Column::AccessedAt.gte(since))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to fetch access timestamps")
    }

    /// Inserts a row with an explicit timestamp.
    pub async fn append_at(
        &self,
        qr_code_id: i32,
        accessed_at: &str,
        record: &AccessRecord,
    ) -> Result<i64> {
        let active_model = qr_access_logs::ActiveModel {
            qr_code_id: Set(qr_code_id),
            accessed_at: Set(accessed_at.to_string()),
            ip_address: Set(record.ip_address.clone()),
            user_agent: Set(Some(record.user_agent.clone())),
            referer: Set(Some(record.referer.clone())),
            ..Default::default()
        };

        let result = QrAccessLogs::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to append access log")?;

        Ok(result.last_insert_id)
    }
}
