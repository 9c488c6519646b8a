use serde::{Deserialize, Serialize};

use crate::entities::{qr_access_logs, qr_codes};
use crate::services::{Bucket, DashboardEntry, QrStats};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QrCodeDto {
    pub id: i32,
    pub code: String,
    pub current_url: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub owner_user_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
    pub public_url: String,
}

impl QrCodeDto {
    #[must_use]
    pub fn new(model: qr_codes::Model, public_url: String) -> Self {
        Self {
            id: model.id,
            code: model.code,
            current_url: model.current_url,
            status: model.status,
            description: model.description,
            owner_user_id: model.owner_user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            public_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardItemDto {
    #[serde(flatten)]
    pub qr: QrCodeDto,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub scans: u64,
}

impl DashboardItemDto {
    #[must_use]
    pub fn new(entry: DashboardEntry, public_url: String) -> Self {
        let (owner_name, owner_email) = entry
            .owner
            .map_or((None, None), |o| (o.name, Some(o.email)));

        Self {
            qr: QrCodeDto::new(entry.qr, public_url),
            owner_name,
            owner_email,
            scans: entry.scans,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub scope_label: String,
    pub is_admin: bool,
    pub items: Vec<DashboardItemDto>,
}

#[derive(Debug, Serialize)]
pub struct AccessLogDto {
    pub accessed_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<qr_access_logs::Model> for AccessLogDto {
    fn from(model: qr_access_logs::Model) -> Self {
        Self {
            accessed_at: model.accessed_at,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            referer: model.referer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub qr: QrCodeDto,
    pub total: u64,
    pub group: String,
    pub chart_title: String,
    pub buckets: Vec<Bucket>,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub recent: Vec<AccessLogDto>,
}

impl StatsDto {
    #[must_use]
    pub fn new(qr: QrCodeDto, stats: QrStats) -> Self {
        let labels = stats.buckets.iter().map(|b| b.key.clone()).collect();
        let values = stats.buckets.iter().map(|b| b.count).collect();

        Self {
            qr,
            total: stats.total,
            group: stats.granularity.as_str().to_string(),
            chart_title: stats.chart_title.to_string(),
            buckets: stats.buckets,
            labels,
            values,
            recent: stats.recent.into_iter().map(AccessLogDto::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewQrForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct EditQrForm {
    #[serde(default)]
    pub current_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UserActiveForm {
    #[serde(default)]
    pub is_active: String,
}
