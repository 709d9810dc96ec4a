//! Application state management

use std::sync::Arc;
use storefront_client::{
    BalanceBoard, BalanceSource, CatalogApi, CatalogController, ClientResult,
};
use storefront_core::Config;

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Catalog sync controller
    pub catalog: Arc<CatalogController>,
    /// Balance dashboard
    pub balance: Arc<BalanceBoard>,
}

impl AppState {
    /// Create state talking HTTP to the configured APIs
    pub fn new(config: Config) -> ClientResult<Self> {
        let catalog = Arc::new(CatalogController::from_config(&config.catalog)?);
        let balance = Arc::new(BalanceBoard::from_config(&config.balance)?);

        Ok(Self {
            config,
            catalog,
            balance,
        })
    }

    /// Create state over explicit backends
    pub fn with_backends(
        config: Config,
        catalog: Arc<dyn CatalogApi>,
        balance: Arc<dyn BalanceSource>,
    ) -> Self {
        let max_pages = config.catalog.max_pages;
        Self {
            config,
            catalog: Arc::new(CatalogController::new(catalog, max_pages)),
            balance: Arc::new(BalanceBoard::new(balance)),
        }
    }
}
