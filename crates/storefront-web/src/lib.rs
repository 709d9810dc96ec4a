//! Storefront admin web backend
//!
//! Exposes the catalog sync controller and the balance board as JSON
//! endpoints for a browser front end.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Re-export the main functions
pub use error::ApiError;
pub use server::build_app;
pub use state::AppState;
