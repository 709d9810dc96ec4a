//! Route definitions for the web backend

use crate::{
    handlers::{balance, catalog, health_check},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Build the complete web application router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/catalog/refresh", post(catalog::refresh_catalog))
        .route("/api/catalog/products", post(catalog::create_product))
        .route(
            "/api/catalog/products/:id",
            put(catalog::update_product).delete(catalog::delete_product),
        )
        // Product form
        .route(
            "/api/catalog/editor",
            post(catalog::open_add_form).delete(catalog::close_form),
        )
        .route("/api/catalog/editor/submit", post(catalog::submit_form))
        .route("/api/catalog/editor/:id", put(catalog::open_edit_form))
        // Balance
        .route("/api/balance", get(balance::get_balance))
        .route("/api/balance/refresh", post(balance::refresh_balance))
        // Health check
        .route("/health", get(health_check))
}
