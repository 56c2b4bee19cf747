use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub storefront: StorefrontConfig,

    pub scheduler: SchedulerConfig,

    pub seed: SeedConfig,

    pub reset: ResetConfig,

    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            storefront: StorefrontConfig::default(),
            scheduler: SchedulerConfig::default(),
            seed: SeedConfig::default(),
            reset: ResetConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/quartermaster.db".to_string(),
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many idle minutes.
    pub session_idle_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
            secure_cookies: true,
            session_idle_minutes: 8 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    /// Minimum length accepted by the password change form.
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// HMAC key for quick-request links. Written by `init`; required to serve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,

    pub token_ttl_minutes: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// How often handed-over requests are checked against their return date.
    pub overdue_check_minutes: u32,

    /// Cron expression for periodic inventory snapshots, e.g. `0 0 3 * * *`.
    pub snapshot_cron: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overdue_check_minutes: 15,
            snapshot_cron: Some("0 0 3 * * *".to_string()),
        }
    }
}

/// Records created on first start and after a system reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub base_name: String,

    pub hq_department_name: String,

    pub super_admin_name: String,

    pub super_admin_phone: String,

    pub hq_commander_name: String,

    pub hq_commander_phone: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            base_name: "בסיס ראשי".to_string(),
            hq_department_name: "מפקדה".to_string(),
            super_admin_name: "מנהל מערכת".to_string(),
            super_admin_phone: "0500000000".to_string(),
            hq_commander_name: "מפקד בסיס".to_string(),
            hq_commander_phone: "0500000001".to_string(),
        }
    }
}

/// Both literals must be typed exactly to wipe the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    pub confirmation_phrase: String,

    pub confirmation_code: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            confirmation_phrase: "מחק הכל".to_string(),
            confirmation_code: "240613".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "quartermaster".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("QUARTERMASTER_CONFIG") {
            let path = PathBuf::from(path);
            info!("Loading config from: {}", path.display());
            return Self::load_from_path(&path);
        }

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
            paths.push(config_dir.join("quartermaster").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".quartermaster").join("config.toml"));
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
            let mut config = Self::default();
            config.storefront.token_secret = Some(generate_secret());
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.storefront.token_secret.as_deref() {
            None => anyhow::bail!(
                "storefront.token_secret is not set; run `quartermaster init` or add it to the config file"
            ),
            Some(secret) if secret.len() < 16 => {
                anyhow::bail!("storefront.token_secret must be at least 16 characters")
            }
            Some(_) => {}
        }

        if self.storefront.token_ttl_minutes == 0 {
            anyhow::bail!("storefront.token_ttl_minutes must be > 0");
        }

        if self.scheduler.enabled && self.scheduler.overdue_check_minutes == 0 {
            anyhow::bail!("Scheduler overdue check interval must be > 0");
        }

        if self.reset.confirmation_phrase.trim().is_empty()
            || self.reset.confirmation_code.trim().is_empty()
        {
            anyhow::bail!("Reset confirmation phrase and code cannot be empty");
        }

        Ok(())
    }
}

/// Random 64 character hex string.
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret() -> Config {
        let mut config = Config::default();
        config.storefront.token_secret = Some(generate_secret());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storefront.token_ttl_minutes, 15);
        assert!(config.storefront.token_secret.is_none());
        assert_eq!(config.scheduler.overdue_check_minutes, 15);
        assert!(config.validate().is_err());

        let config = with_secret();
        assert_eq!(config.storefront.token_secret.as_deref().map(str::len), Some(64));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_token_secret_is_rejected() {
        let config: Config = toml::from_str("[general]\nlog_level = \"info\"\n").unwrap();
        assert!(config.storefront.token_secret.is_none());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_secret"));
    }

    #[test]
    fn test_tokens_verify_across_loads_of_same_file() {
        let toml_str = toml::to_string_pretty(&with_secret()).unwrap();

        let issuer: Config = toml::from_str(&toml_str).unwrap();
        let verifier: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            issuer.storefront.token_secret,
            verifier.storefront.token_secret
        );

        let expiry = 1_900_000_000_000;
        let token = crate::storefront::issue(
            issuer.storefront.token_secret.unwrap().as_bytes(),
            12,
            expiry,
        )
        .unwrap();
        let user_id = crate::storefront::verify(
            verifier.storefront.token_secret.unwrap().as_bytes(),
            &token,
            expiry - 1,
        )
        .unwrap();
        assert_eq!(user_id, 12);
    }

    #[test]
    fn test_config_serialization() {
        let config = with_secret();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("token_secret"));
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[storefront]"));
        assert!(toml_str.contains("[reset]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [storefront]
            token_secret = "0123456789abcdef0123"
            token_ttl_minutes = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storefront.token_ttl_minutes, 5);
        assert_eq!(config.seed.super_admin_phone, "0500000000");
    }

    #[test]
    fn test_validate_rejects_weak_storefront_settings() {
        let mut config = with_secret();
        config.storefront.token_secret = Some("short".to_string());
        assert!(config.validate().is_err());

        let mut config = with_secret();
        config.storefront.token_ttl_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = with_secret();
        config.scheduler.overdue_check_minutes = 0;
        assert!(config.validate().is_err());
        config.scheduler.enabled = false;
        assert!(config.validate().is_ok());
    }
}
