//! Configuration module
//!
//! TOML file (default `~/.config/yms/config.toml`, or `YMS_CONFIG`) with
//! every section optional. A few secrets can be overridden from the
//! environment so they need not live on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yms")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub verification: VerificationConfig,
    pub mail: MailConfig,
    pub cors: CorsConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Read the file and apply environment overrides. A missing file
    /// yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("SESSION_SECRET") {
            self.security.session_secret = secret;
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.mail.password = Some(password);
        }
    }
}

// ── Sections ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    /// Drop and recreate the schema at startup
    pub reset_on_startup: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://yms.db?mode=rwc".to_string(),
            reset_on_startup: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-me-in-production".to_string(),
            session_ttl_hours: 168,
            cookie_name: "yms.auth".to_string(),
            cookie_secure: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub code_ttl_minutes: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    Smtp,
    /// Development only: log recipient and subject, deliver nothing
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Smtp,
            host: String::new(),
            port: 587,
            username: None,
            password: None,
            from_email: "no-reply@yms.local".to_string(),
            from_name: "YMS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Administrator created when the directory is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@yms.local".to_string(),
            display_name: "Administrator".to_string(),
            password: "Admin123!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.security.cookie_name, "yms.auth");
        assert_eq!(config.verification.code_ttl_minutes, 15);
        assert_eq!(config.mail.transport, MailTransport::Smtp);
    }

    #[test]
    fn mail_defaults_to_unconfigured_smtp() {
        let mail = AppConfig::default().mail;
        assert_eq!(mail.transport, MailTransport::Smtp);
        assert!(mail.host.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            api_port = 9100

            [mail]
            transport = "smtp"
            host = "smtp.example.com"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 9100);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.mail.transport, MailTransport::Smtp);
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn env_overrides_replace_secrets() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            "SESSION_SECRET" => Some("from-env".to_string()),
            "SMTP_PASSWORD" => Some("smtp-secret".to_string()),
            _ => None,
        });

        assert_eq!(config.security.session_secret, "from-env");
        assert_eq!(config.mail.password.as_deref(), Some("smtp-secret"));
        assert_eq!(config.database.url, DatabaseSection::default().url);
    }

    #[test]
    fn load_reads_file_and_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join(format!("yms-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        std::fs::write(
            &path,
            r#"
            [server]
            api_port = 9200

            [cors]
            allowed_origins = ["https://yard.example.com"]
            "#,
        )
        .unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.server.api_port, 9200);
        assert_eq!(loaded.cors.allowed_origins, vec!["https://yard.example.com"]);

        let missing = AppConfig::load(&dir.join("absent.toml")).unwrap();
        assert_eq!(missing.server.api_port, 8080);

        std::fs::remove_dir_all(dir).ok();
    }
}
