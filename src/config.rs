//! TOML configuration.
//!
//! Every section has defaults, so an empty file is a valid configuration.
//! `ALLOWED_ORIGINS` in the environment (comma-separated) replaces
//! `server.allowed_origins`, and `RUST_LOG` replaces `logging.filter`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use r2agi_core::id::{IdLength, DEFAULT_HEX_LEN, FULL_HEX_LEN, MIN_HEX_LEN};
use r2agi_core::service::DEFAULT_LIST_LIMIT;
use r2agi_core::validate::Limits;

/// Environment variable overriding `server.allowed_origins`.
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ids: IdsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which key-value backend the service is built on.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
    /// No backend: listings are empty and submissions are not persisted.
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_db_path(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/artifacts.sqlite")
}
fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            service_name: default_service_name(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_service_name() -> String {
    "r2agi-api".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdsConfig {
    #[serde(default = "default_hex_len")]
    pub hex_len: usize,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            hex_len: default_hex_len(),
        }
    }
}

fn default_hex_len() -> usize {
    DEFAULT_HEX_LEN
}

impl IdsConfig {
    pub fn id_length(&self) -> Result<IdLength> {
        IdLength::new(self.hex_len).ok_or_else(|| {
            anyhow::anyhow!(
                "ids.hex_len must be between {} and {}",
                MIN_HEX_LEN,
                FULL_HEX_LEN
            )
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
    #[serde(default = "default_max_tag_bytes")]
    pub max_tag_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content_bytes(),
            max_tags: default_max_tags(),
            max_tag_bytes: default_max_tag_bytes(),
        }
    }
}

fn default_max_content_bytes() -> usize {
    Limits::default().max_content_bytes
}
fn default_max_tags() -> usize {
    Limits::default().max_tags
}
fn default_max_tag_bytes() -> usize {
    Limits::default().max_tag_bytes
}

impl LimitsConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            max_content_bytes: self.max_content_bytes,
            max_tags: self.max_tags,
            max_tag_bytes: self.max_tag_bytes,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> String {
    "http://127.0.0.1:8787".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if let Ok(raw) = std::env::var(ALLOWED_ORIGINS_ENV) {
        config.server.allowed_origins = parse_origins(&raw);
    }

    Ok(config)
}

/// Parses and validates configuration text without consulting the
/// environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.list_limit < 1 {
        anyhow::bail!("store.list_limit must be >= 1");
    }

    config.ids.id_length()?;

    if config.limits.max_content_bytes == 0 {
        anyhow::bail!("limits.max_content_bytes must be > 0");
    }
    if config.limits.max_tag_bytes == 0 {
        anyhow::bail!("limits.max_tag_bytes must be > 0");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.store.backend, Backend::Sqlite);
        assert_eq!(cfg.store.list_limit, 100);
        assert_eq!(cfg.server.service_name, "r2agi-api");
        assert!(cfg.server.allowed_origins.is_empty());
        assert_eq!(cfg.ids.id_length().unwrap().get(), 16);
        assert_eq!(cfg.limits.limits(), Limits::default());
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
[store]
backend = "memory"
list_limit = 25

[server]
bind = "0.0.0.0:9000"
service_name = "intake"
allowed_origins = ["https://a.example", "https://b.example"]

[ids]
hex_len = 64

[limits]
max_content_bytes = 10
max_tags = 2
max_tag_bytes = 8

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.store.backend, Backend::Memory);
        assert_eq!(cfg.store.list_limit, 25);
        assert_eq!(cfg.server.allowed_origins.len(), 2);
        assert_eq!(cfg.ids.hex_len, 64);
        assert_eq!(cfg.limits.limits().max_tags, 2);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(parse_config("[ids]\nhex_len = 8").is_err());
        assert!(parse_config("[store]\nlist_limit = 0").is_err());
        assert!(parse_config("[store]\nbackend = \"redis\"").is_err());
        assert!(parse_config("[limits]\nmax_content_bytes = 0").is_err());
        assert!(parse_config("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/r2agi.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
