//! Domain types for codes, users and the ownership gate.
//!
//! Roles and statuses are persisted as text; these enums are the typed view
//! the services work with.

pub mod time;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::{qr_codes, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Lenient parse used for form input: anything unrecognized is a
    /// regular user.
    #[must_use]
    pub fn parse_or_user(value: &str) -> Self {
        value.parse().unwrap_or(Self::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrStatus {
    #[default]
    Active,
    Inactive,
}

impl QrStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Stored values other than `active` never redirect.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == Self::Active.as_str() {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl fmt::Display for QrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Invalid status: {other}")),
        }
    }
}

/// The authenticated user acting on a request.
///
/// Built by the auth middleware from the session and handed to handlers
/// explicitly; nothing looks it up from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins see every code; everyone else only the codes they own.
    #[must_use]
    pub fn can_access(&self, qr: &qr_codes::Model) -> bool {
        self.is_admin() || qr.owner_user_id == Some(self.id)
    }
}

impl From<users::Model> for Principal {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            role: Role::parse_or_user(&model.role),
            email: model.email,
            name: model.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qr_owned_by(owner: Option<i32>) -> qr_codes::Model {
        qr_codes::Model {
            id: 1,
            code: "QR-001".to_string(),
            current_url: None,
            status: "active".to_string(),
            description: None,
            owner_user_id: owner,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id,
            email: format!("user{id}@example.com"),
            name: None,
            role,
        }
    }

    #[test]
    fn test_admin_can_access_everything() {
        let admin = principal(1, Role::Admin);
        assert!(admin.can_access(&qr_owned_by(Some(7))));
        assert!(admin.can_access(&qr_owned_by(None)));
    }

    #[test]
    fn test_user_can_access_only_owned() {
        let user = principal(7, Role::User);
        assert!(user.can_access(&qr_owned_by(Some(7))));
        assert!(!user.can_access(&qr_owned_by(Some(8))));
        assert!(!user.can_access(&qr_owned_by(None)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::parse_or_user("ADMIN "), Role::Admin);
        assert_eq!(Role::parse_or_user("user"), Role::User);
        assert_eq!(Role::parse_or_user("superuser"), Role::User);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("inactive".parse::<QrStatus>(), Ok(QrStatus::Inactive));
        assert!("paused".parse::<QrStatus>().is_err());
        assert_eq!(QrStatus::from_stored("disabled"), QrStatus::Inactive);
        assert_eq!(QrStatus::from_stored("active"), QrStatus::Active);
    }
}
