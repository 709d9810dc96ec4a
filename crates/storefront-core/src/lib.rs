//! Core types and utilities for the storefront admin

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod balance;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use balance::{AccountBalance, BalanceInquiry, BalanceMetric, BalanceRow, Money};
pub use config::{
    BalanceConfig, CatalogConfig, Config, LogFormat, LoggingConfig, UpdateTransport,
    WebServerConfig,
};
pub use error::{Error, Result};
pub use types::{ApiMessage, ImageUpload, Price, Product, ProductDraft, ProductId, ProductPage};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(logging: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = match logging.format {
        LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    installed.map_err(|e| Error::Configuration {
        message: format!("Failed to initialize logging: {e}"),
    })
}
