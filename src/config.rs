//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub cloudflare: Option<CloudflareConfig>,
    pub auth: AuthConfig,
    pub instance: InstanceConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "social.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://social.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Storage configuration (snapshot and content stores)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub snapshot: SnapshotStoreConfig,
    pub content: ContentStoreConfig,
}

/// Store backend selector
///
/// `File` reads/writes the local filesystem (development, tests);
/// `R2` talks to a Cloudflare R2 bucket.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    R2,
}

/// Snapshot store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotStoreConfig {
    /// Backend to read the published snapshot from
    #[serde(default)]
    pub backend: StoreBackend,
    /// Local path to the snapshot document (file backend)
    pub path: Option<PathBuf>,
    /// R2 bucket holding the snapshot (r2 backend)
    pub bucket: Option<String>,
    /// Object key of the snapshot document
    #[serde(default = "default_snapshot_key")]
    pub key: String,
}

fn default_snapshot_key() -> String {
    "snapshot.json".to_string()
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ContentStoreConfig {
    /// Backend to commit new post documents to
    #[serde(default)]
    pub backend: StoreBackend,
    /// Local root directory for committed documents (file backend)
    pub path: Option<PathBuf>,
    /// R2 bucket for committed documents (r2 backend)
    pub bucket: Option<String>,
    /// Key prefix for post documents
    #[serde(default = "default_content_prefix")]
    pub prefix: String,
}

fn default_content_prefix() -> String {
    "posts".to_string()
}

/// Cloudflare credentials
///
/// Only required when a store uses the r2 backend.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareConfig {
    /// Cloudflare account ID
    pub account_id: String,
    /// R2 access key ID
    pub r2_access_key_id: String,
    /// R2 secret access key
    pub r2_secret_access_key: String,
}

/// Authentication configuration (identity-bridging OAuth)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Provider login of the single authorized owner
    pub owner_login: String,
    /// Secret key for signing bridge state (32+ bytes)
    pub state_secret: String,
    /// Enable the authorized write path (POST /api/v1/statuses)
    #[serde(default)]
    pub write_enabled: bool,
    pub provider: ProviderConfig,
}

/// External identity provider (GitHub) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Browser-facing authorization endpoint
    #[serde(default = "default_provider_authorize_url")]
    pub authorize_url: String,
    /// Server-to-server code exchange endpoint
    #[serde(default = "default_provider_token_url")]
    pub token_url: String,
    /// Authenticated-user lookup endpoint
    #[serde(default = "default_provider_user_url")]
    pub user_url: String,
    /// Scope requested from the provider
    #[serde(default = "default_provider_scope")]
    pub scope: String,
}

fn default_provider_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_provider_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_provider_user_url() -> String {
    "https://api.github.com/user".to_string()
}

fn default_provider_scope() -> String {
    "read:user".to_string()
}

/// Instance metadata
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    pub title: String,
    pub description: String,
    pub contact_email: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (AMBERFEED_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("storage.snapshot.backend", "file")?
            .set_default("storage.snapshot.key", "snapshot.json")?
            .set_default("storage.content.backend", "file")?
            .set_default("storage.content.prefix", "posts")?
            .set_default("auth.write_enabled", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (AMBERFEED_*)
            .add_source(
                Environment::with_prefix("AMBERFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_STATE_SECRET_BYTES: usize = 32;

        if self.auth.state_secret.as_bytes().len() < MIN_STATE_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.state_secret must be at least {} bytes",
                MIN_STATE_SECRET_BYTES
            )));
        }

        let uses_r2 = self.storage.snapshot.backend == StoreBackend::R2
            || self.storage.content.backend == StoreBackend::R2;
        if uses_r2 && self.cloudflare.is_none() {
            return Err(crate::error::AppError::Config(
                "cloudflare credentials are required when a store uses the r2 backend".to_string(),
            ));
        }
        if self.storage.snapshot.backend == StoreBackend::R2
            && self.storage.snapshot.bucket.is_none()
        {
            return Err(crate::error::AppError::Config(
                "storage.snapshot.bucket is required for the r2 backend".to_string(),
            ));
        }
        if self.storage.snapshot.backend == StoreBackend::File
            && self.storage.snapshot.path.is_none()
        {
            return Err(crate::error::AppError::Config(
                "storage.snapshot.path is required for the file backend".to_string(),
            ));
        }
        if self.auth.write_enabled {
            match self.storage.content.backend {
                StoreBackend::R2 if self.storage.content.bucket.is_none() => {
                    return Err(crate::error::AppError::Config(
                        "storage.content.bucket is required for the r2 backend".to_string(),
                    ));
                }
                StoreBackend::File if self.storage.content.path.is_none() => {
                    return Err(crate::error::AppError::Config(
                        "storage.content.path is required for the file backend".to_string(),
                    ));
                }
                _ => {}
            }
        }

        if !self.server.protocol.eq_ignore_ascii_case("https")
            && !is_local_server_domain(&self.server.domain)
        {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
