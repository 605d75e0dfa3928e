use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory of static assets served under /public
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5500
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens. Generated per process when not
    /// configured, which invalidates outstanding tokens across restarts.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
    /// Mark auth cookies `Secure`. Off for local development over plain
    /// HTTP, on for anything production-like.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Initial admin account, created at startup when missing
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_secs: default_token_ttl(),
            session_ttl_secs: default_session_ttl(),
            secure_cookies: false,
            admin_email: None,
            admin_password: None,
        }
    }
}

fn default_token_secret() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_token_ttl() -> i64 {
    3600
}

fn default_session_ttl() -> i64 {
    86400
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.port, 5500);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(!config.auth.secure_cookies);
        assert!(!config.auth.token_secret.is_empty());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8088

            [auth]
            token_secret = "not-a-real-secret"
            secure_cookies = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.auth.token_secret, "not-a-real-secret");
        assert!(config.auth.secure_cookies);
        assert_eq!(config.auth.session_ttl_secs, 86400);
    }
}
