//! Public `/r/{code}` resolution.
//!
//! Every attempt against an existing code is logged before the outcome is
//! decided, so disabled and unconfigured codes still show up in the stats.

use std::net::IpAddr;

use anyhow::Result;
use tracing::{debug, info};

use crate::db::{AccessRecord, Store};
use crate::domain::QrStatus;
use crate::domain::validation::normalize_destination;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Disabled,
    NotConfigured,
    Redirect(String),
}

impl Outcome {
    /// Label used for the `qr_redirects_total` counter.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Disabled => "disabled",
            Self::NotConfigured => "not_configured",
            Self::Redirect(_) => "redirect",
        }
    }
}

#[derive(Clone)]
pub struct RedirectService {
    store: Store,
}

impl RedirectService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves `code`, appending one access-log row when the code exists.
    ///
    /// # Errors
    ///
    /// Fails only on storage errors; the log insert is committed before any
    /// outcome is returned.
    pub async fn resolve(&self, code: &str, record: &AccessRecord) -> Result<Outcome> {
        let outcome = match self.store.get_qr_code_by_code(code).await? {
            None => Outcome::NotFound,
            Some(qr) => {
                let log_id = self.store.append_access_log(qr.id, record).await?;
                debug!(qr_id = qr.id, log_id, "Access logged");

                if QrStatus::from_stored(&qr.status) != QrStatus::Active {
                    Outcome::Disabled
                } else {
                    // Rows written before normalization may hold raw input.
                    qr.current_url
                        .as_deref()
                        .and_then(normalize_destination)
                        .map_or(Outcome::NotConfigured, Outcome::Redirect)
                }
            }
        };

        metrics::counter!("qr_redirects_total", "outcome" => outcome.label()).increment(1);
        info!(
            event = "qr_resolved",
            code,
            outcome = outcome.label(),
            ip = record.ip_address.as_deref().unwrap_or("-"),
            "QR code resolved"
        );

        Ok(outcome)
    }
}

/// First `X-Forwarded-For` entry when present, else the peer address.
#[must_use]
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Option<String> {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(ToString::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
}
