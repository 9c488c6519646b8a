pub mod access_log;
pub mod qr_code;
pub mod user;
