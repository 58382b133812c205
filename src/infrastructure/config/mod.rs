//! Service configuration.
//!
//! Layers, lowest precedence first: built-in defaults, `fairaudit.toml` (or the
//! file named by `FAIRAUDIT_CONFIG`), the environment names used by earlier
//! deployments (`SUI_RELAYER_URL`, `OPENAI_API_KEY`, ...), then
//! `FAIRAUDIT_<SECTION>__<KEY>` variables.

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Uncased, UncasedStr};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "fairaudit.toml";
pub const DEFAULT_EXPLORER_TEMPLATE: &str = "https://explorer.sui.io/tx/{tx}";

const LEGACY_ENV_KEYS: &[&str] = &[
    "MAX_UPLOAD_MB",
    "OPENAI_API_KEY",
    "SUI_RELAYER_URL",
    "SUI_EXPLORER_URL_TEMPLATE",
    "WALRUS_PUBLISHER_URL",
    "WALRUS_AGGREGATOR_URL",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: u64,
    pub tmp_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_mb: 20,
            tmp_dir: PathBuf::from("tmp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobBackend {
    /// Walrus publisher/aggregator HTTP API
    Walrus,
    /// Content-addressed files on local disk
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    pub backend: BlobBackend,
    pub publisher_url: String,
    pub aggregator_url: String,
    pub epochs: u32,
    pub local_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Local,
            publisher_url: "https://publisher.walrus-testnet.walrus.space".to_string(),
            aggregator_url: "https://aggregator.walrus-testnet.walrus.space".to_string(),
            epochs: 1,
            local_dir: PathBuf::from("blobs"),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Relayer endpoint that submits proofs on-chain; unset means simulated receipts
    pub relayer_url: Option<String>,
    pub explorer_url_template: String,
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            relayer_url: None,
            explorer_url_template: DEFAULT_EXPLORER_TEMPLATE.to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Cut-off applied to probability-like columns
    pub threshold: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub explain: LLMConfig,
    pub blob_store: BlobStoreConfig,
    pub ledger: LedgerConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load `.env`, merge every layer and validate the result
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config: AppConfig = Self::figment()
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }

    pub fn figment() -> Figment {
        let path = std::env::var("FAIRAUDIT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(LEGACY_ENV_KEYS).map(legacy_key))
            .merge(Env::prefixed("FAIRAUDIT_").split("__"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".to_string());
        }
        if self.server.max_upload_mb == 0 {
            return Err("server.max_upload_mb must be > 0".to_string());
        }
        if !(self.audit.threshold > 0.0 && self.audit.threshold <= 1.0) {
            return Err("audit.threshold must be in (0.0, 1.0]".to_string());
        }
        if self.explain.is_enabled() {
            check_url("explain.base_url", &self.explain.base_url)?;
        }
        if self.blob_store.backend == BlobBackend::Walrus {
            check_url("blob_store.publisher_url", &self.blob_store.publisher_url)?;
            check_url("blob_store.aggregator_url", &self.blob_store.aggregator_url)?;
            if self.blob_store.epochs == 0 {
                return Err("blob_store.epochs must be > 0".to_string());
            }
        }
        if let Some(relayer) = &self.ledger.relayer_url {
            check_url("ledger.relayer_url", relayer)?;
        }
        if !self.ledger.explorer_url_template.contains("{tx}") {
            return Err("ledger.explorer_url_template must contain {tx}".to_string());
        }
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> std::result::Result<(), String> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| format!("{} is not a valid URL ({}): {}", field, value, e))
}

fn legacy_key(key: &UncasedStr) -> Uncased<'_> {
    match key.as_str().to_ascii_uppercase().as_str() {
        "MAX_UPLOAD_MB" => "server.max_upload_mb".into(),
        "OPENAI_API_KEY" => "explain.api_key".into(),
        "SUI_RELAYER_URL" => "ledger.relayer_url".into(),
        "SUI_EXPLORER_URL_TEMPLATE" => "ledger.explorer_url_template".into(),
        "WALRUS_PUBLISHER_URL" => "blob_store.publisher_url".into(),
        "WALRUS_AGGREGATOR_URL" => "blob_store.aggregator_url".into(),
        _ => key.into(),
    }
}
