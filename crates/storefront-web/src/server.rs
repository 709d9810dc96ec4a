//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest accepted request body, image uploads included
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the complete web application with all routes and state
pub fn build_app(state: AppState) -> Router {
    build_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
