pub use super::qr_access_logs::Entity as QrAccessLogs;
pub use super::qr_codes::Entity as QrCodes;
pub use super::users::Entity as Users;
