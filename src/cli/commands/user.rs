use std::sync::Arc;

use crate::config::Config;
use crate::services::NewUser;
use crate::state::SharedState;

pub async fn cmd_create_user(
    config: &Config,
    email: &str,
    password: &str,
    name: Option<&str>,
    role: &str,
) -> anyhow::Result<()> {
    let shared = Arc::new(SharedState::new(config.clone()).await?);

    let user = shared
        .auth_service
        .create_user(NewUser {
            name: name.unwrap_or_default().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        })
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Created {} user #{}: {}", user.role, user.id, user.email);
    Ok(())
}

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let shared = SharedState::new(config.clone()).await?;
    let users = shared
        .auth_service
        .list_users()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Users:");
    println!("{:-<70}", "");

    for user in users {
        println!(
            "#{:<4} {:<32} {:<6} {}",
            user.id,
            user.email,
            user.role,
            if user.is_active { "active" } else { "disabled" }
        );
    }

    Ok(())
}
