//! Application configuration management.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Ledger engine behavior.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Receipt drafting.
    #[serde(default)]
    pub receipts: ReceiptConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

impl From<&JwtConfig> for crate::jwt::JwtConfig {
    fn from(config: &JwtConfig) -> Self {
        let minutes = i64::try_from(config.access_token_expiry_secs / 60).unwrap_or(i64::MAX);
        Self {
            secret: config.secret.clone(),
            access_token_expires_minutes: minutes.max(1),
        }
    }
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Create and activate a term from today's date when none is active.
    #[serde(default = "default_auto_create_term")]
    pub auto_create_term: bool,
    /// Rows fetched per page when streaming ledger entries.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Extra ledger category aliases, alias name to canonical name.
    #[serde(default)]
    pub category_aliases: HashMap<String, String>,
}

fn default_auto_create_term() -> bool {
    true
}

fn default_page_size() -> u32 {
    200
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            auto_create_term: default_auto_create_term(),
            page_size: default_page_size(),
            category_aliases: HashMap::new(),
        }
    }
}

/// Receipt drafting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    /// Dorm name printed on receipts.
    #[serde(default = "default_dorm_name")]
    pub dorm_name: String,
    /// Signature line appended to receipt bodies.
    #[serde(default)]
    pub signature: Option<String>,
}

fn default_dorm_name() -> String {
    "Dormitory".to_string()
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            dorm_name: default_dorm_name(),
            signature: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("WARDEN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reads_environment_overrides() {
        temp_env::with_vars(
            [
                ("WARDEN__DATABASE__URL", Some("postgres://localhost/warden_test")),
                ("WARDEN__JWT__SECRET", Some("secret")),
                ("WARDEN__SERVER__PORT", Some("9090")),
                ("WARDEN__LEDGER__AUTO_CREATE_TERM", Some("false")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/warden_test");
                assert_eq!(config.server.port, 9090);
                assert!(!config.ledger.auto_create_term);
                assert_eq!(config.ledger.page_size, 200);
                assert_eq!(config.receipts.dorm_name, "Dormitory");
            },
        );
    }

    #[test]
    fn test_jwt_expiry_converts_to_minutes() {
        let config = JwtConfig {
            secret: "s".to_string(),
            access_token_expiry_secs: 5400,
        };
        let service_config = crate::jwt::JwtConfig::from(&config);
        assert_eq!(service_config.access_token_expires_minutes, 90);
        assert_eq!(service_config.secret, "s");
    }

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert!(ledger.auto_create_term);
        assert!(ledger.category_aliases.is_empty());
    }
}
