//! Catalog API trait

use crate::error::ClientResult;
use async_trait::async_trait;
use storefront_core::{ApiMessage, ProductDraft, ProductId, ProductPage};

/// Remote product catalog
///
/// Implementations map server failures onto [`crate::ClientError`] the same
/// way: 422 becomes `Validation`, 404 becomes `NotFound` and the server's
/// `message` is carried unchanged.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of the listing (1-based)
    async fn fetch_page(&self, page: u32) -> ClientResult<ProductPage>;

    /// Create a product
    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<ApiMessage>;

    /// Replace a product's fields; a draft without an image keeps the current one
    async fn update_product(&self, id: ProductId, draft: &ProductDraft)
        -> ClientResult<ApiMessage>;

    /// Delete a product
    async fn delete_product(&self, id: ProductId) -> ClientResult<ApiMessage>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
