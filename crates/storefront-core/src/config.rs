//! Configuration management for the storefront admin

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Balance inquiry API configuration
    #[serde(default)]
    pub balance: BalanceConfig,

    /// Admin web server configuration
    #[serde(default)]
    pub webserver: WebServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How product updates are sent to the Catalog API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTransport {
    /// `POST /api/products/{id}` carrying a `_method=PUT` form field
    #[default]
    MethodOverride,
    /// Multipart `PUT /api/products/{id}`
    NativePut,
}

/// Catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the Catalog API
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Path under `base_url` where product images are served
    #[serde(default = "default_image_path")]
    pub image_path: String,

    /// Upper bound on pages read by one refresh
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Update request style
    #[serde(default)]
    pub update_transport: UpdateTransport,
}

impl CatalogConfig {
    /// Base URL product image filenames are resolved against
    pub fn image_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.image_path.trim_matches('/')
        )
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            image_path: default_image_path(),
            max_pages: default_max_pages(),
            request_timeout: default_request_timeout(),
            update_transport: UpdateTransport::default(),
        }
    }
}

/// Balance inquiry API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Base URL of the balance inquiry service
    #[serde(default = "default_balance_base_url")]
    pub base_url: String,

    /// Inquiry endpoint path
    #[serde(default = "default_balance_path")]
    pub path: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl BalanceConfig {
    /// Full inquiry URL
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_balance_base_url(),
            path: default_balance_path(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Admin web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Refresh the catalog once at startup
    #[serde(default = "default_refresh_on_start")]
    pub refresh_on_start: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            refresh_on_start: default_refresh_on_start(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-line output
    #[default]
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_catalog_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_image_path() -> String {
    "assets/images/".to_string()
}

const fn default_max_pages() -> u32 {
    500
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_balance_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_balance_path() -> String {
    "/api-maybank-v1/balinfo".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_refresh_on_start() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `storefront.toml` (or `path`) and the environment
    ///
    /// Environment variables use the `STOREFRONT_` prefix and `__` between
    /// nested keys, e.g. `STOREFRONT_CATALOG__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source cannot be parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("storefront").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("STOREFRONT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("balance.base_url", &self.balance.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(crate::Error::Configuration {
                    message: format!("{name} must be an http(s) URL, got '{url}'"),
                });
            }
        }

        if self.catalog.max_pages == 0 {
            return Err(crate::Error::Configuration {
                message: "catalog.max_pages must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
