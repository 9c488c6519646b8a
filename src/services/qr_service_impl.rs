//! `SeaORM` implementation of the `QrService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::db::{QrCodeChanges, Store};
use crate::domain::validation::{parse_code, parse_destination};
use crate::domain::{Principal, QrStatus};
use crate::entities::qr_codes;
use crate::services::is_unique_violation;
use crate::services::qr_service::{
    DashboardEntry, DashboardListing, OwnerSummary, QrError, QrService, QrUpdate,
};

pub struct SeaOrmQrService {
    store: Store,
}

impl SeaOrmQrService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owners_of(
        &self,
        codes: &[qr_codes::Model],
    ) -> Result<HashMap<i32, OwnerSummary>, QrError> {
        let mut ids: Vec<i32> = codes.iter().filter_map(|qr| qr.owner_user_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.store.get_users_by_ids(&ids).await?;
        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    OwnerSummary {
                        name: u.name,
                        email: u.email,
                    },
                )
            })
            .collect())
    }
}

fn gate(principal: &Principal, qr: Option<qr_codes::Model>) -> Result<qr_codes::Model, QrError> {
    qr.filter(|qr| principal.can_access(qr))
        .ok_or(QrError::NotFound)
}

#[async_trait]
impl QrService for SeaOrmQrService {
    async fn create(
        &self,
        principal: &Principal,
        code: &str,
        description: &str,
    ) -> Result<qr_codes::Model, QrError> {
        let code = parse_code(code).map_err(QrError::Validation)?;

        if self.store.get_qr_code_by_code(&code).await?.is_some() {
            return Err(QrError::Duplicate(code));
        }

        let qr = self
            .store
            .insert_qr_code(&code, description.trim(), principal.id)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    QrError::Duplicate(code.clone())
                } else {
                    QrError::from(e)
                }
            })?;

        info!(qr_id = qr.id, code = %qr.code, owner = principal.id, "QR code created");
        Ok(qr)
    }

    async fn list_for(&self, principal: &Principal) -> Result<DashboardListing, QrError> {
        let (scope_label, owner_filter) = if principal.is_admin() {
            ("All QR codes (admin)", None)
        } else {
            ("Your QR codes", Some(principal.id))
        };

        let codes = self.store.list_qr_codes(owner_filter).await?;
        let ids: Vec<i32> = codes.iter().map(|qr| qr.id).collect();
        let scans = self.store.count_access_logs_for(&ids).await?;

        let owners = if principal.is_admin() {
            self.owners_of(&codes).await?
        } else {
            HashMap::new()
        };

        let entries = codes
            .into_iter()
            .map(|qr| DashboardEntry {
                owner: qr
                    .owner_user_id
                    .and_then(|id| owners.get(&id).cloned())
                    .or_else(|| {
                        // Non-admins only ever see their own codes.
                        (!principal.is_admin()).then(|| OwnerSummary {
                            name: principal.name.clone(),
                            email: principal.email.clone(),
                        })
                    }),
                scans: scans.get(&qr.id).copied().unwrap_or(0),
                qr,
            })
            .collect();

        Ok(DashboardListing {
            scope_label,
            entries,
        })
    }

    async fn get_for(&self, principal: &Principal, id: i32) -> Result<qr_codes::Model, QrError> {
        gate(principal, self.store.get_qr_code(id).await?)
    }

    async fn get_by_code_for(
        &self,
        principal: &Principal,
        code: &str,
    ) -> Result<qr_codes::Model, QrError> {
        gate(principal, self.store.get_qr_code_by_code(code).await?)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: i32,
        update: QrUpdate,
    ) -> Result<qr_codes::Model, QrError> {
        let existing = self.get_for(principal, id).await?;

        let current_url = parse_destination(&update.current_url).map_err(QrError::Validation)?;
        let status: QrStatus = update
            .status
            .trim()
            .parse()
            .map_err(|_| QrError::Validation("Invalid status".to_string()))?;

        let changes = QrCodeChanges {
            current_url,
            description: update.description.trim().to_string(),
            status,
        };

        let qr = self.store.update_qr_code(existing, changes).await?;

        info!(qr_id = qr.id, status = %status, actor = principal.id, "QR code updated");
        Ok(qr)
    }
}
