use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub bootstrap: BootstrapConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/app.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Public origin used to build `/r/{code}` links and QR images.
    pub base_url: String,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Secret used to sign session cookies. At least 64 bytes; shorter
    /// secrets fall back to a random per-process key.
    pub session_secret: String,

    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            base_url: "http://127.0.0.1:5000".to_string(),
            secure_cookies: true,
            session_secret: String::new(),
            session_inactivity_minutes: 60 * 12,
        }
    }
}

/// Administrator account materialized on startup when both fields are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_email: String,

    #[serde(skip_serializing)]
    pub admin_password: String,

    pub admin_name: String,
}

impl BootstrapConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.admin_email.trim().is_empty() && !self.admin_password.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            bootstrap: BootstrapConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and process
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with the deployment variables the service has
    /// always honoured (`DB_PATH`, `BASE_URL`, `ADMIN_EMAIL`, ...).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("DB_PATH") {
            self.general.database_path = if path.starts_with("sqlite:") {
                path
            } else {
                format!("sqlite:{path}")
            };
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Some(url) = get("BASE_URL") {
            self.server.base_url = url;
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(secret) = get("SECRET_KEY") {
            self.server.session_secret = secret;
        }
        if let Some(email) = get("ADMIN_EMAIL") {
            self.bootstrap.admin_email = email;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            self.bootstrap.admin_password = password;
        }
        if let Some(name) = get("ADMIN_NAME") {
            self.bootstrap.admin_name = name;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("qrlink").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".qrlink").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.server.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.server.base_url))?;

        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("base_url must use http or https");
        }

        if self.general.max_db_connections == 0 {
            anyhow::bail!("max_db_connections must be > 0");
        }

        Ok(())
    }

    /// Public link encoded into QR images.
    #[must_use]
    pub fn public_url(&self, code: &str) -> String {
        format!("{}/r/{}", self.server.base_url.trim_end_matches('/'), code)
    }
}
