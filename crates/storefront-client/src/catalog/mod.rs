//! Product catalog: API seam, pagination and the sync controller

pub mod api;
pub mod controller;
pub mod deletion;
pub mod editor;
pub mod http;
pub mod memory;
pub mod pagination;

pub use api::CatalogApi;
pub use controller::{CatalogController, CatalogSnapshot, Mutation, RefreshOutcome};
pub use deletion::{ConfirmedDeletion, PendingDeletion};
pub use editor::{EditorState, ProductForm};
pub use http::HttpCatalogApi;
pub use memory::InMemoryCatalog;
pub use pagination::{fetch_all_pages, into_snapshot};
