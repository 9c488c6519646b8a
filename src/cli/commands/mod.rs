mod init;
mod migrate;
mod user;

pub use init::cmd_init;
pub use migrate::cmd_migrate;
pub use user::{cmd_create_user, cmd_list_users};
