pub mod prelude;

pub mod qr_access_logs;
pub mod qr_codes;
pub mod users;
