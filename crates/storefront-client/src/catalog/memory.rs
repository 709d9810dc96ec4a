//! In-memory Catalog API for tests and offline demos

use crate::catalog::api::CatalogApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use storefront_core::{ApiMessage, Price, Product, ProductDraft, ProductId, ProductPage};

const DEFAULT_PAGE_SIZE: usize = 10;

/// Catalog held in memory, answering the way the Catalog API does
///
/// Ids are assigned on create, pages are served in ascending id order,
/// invalid drafts answer 422 and unknown ids answer 404.
#[derive(Debug)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogStore>,
    page_size: usize,
    endless_pages: bool,
    fetches: AtomicUsize,
}

#[derive(Debug, Default)]
struct CatalogStore {
    products: BTreeMap<ProductId, Product>,
    next_id: ProductId,
    failures: VecDeque<(u16, String)>,
    fetch_failures: VecDeque<(u16, String)>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogStore {
                next_id: 1,
                ..CatalogStore::default()
            }),
            page_size: DEFAULT_PAGE_SIZE,
            endless_pages: false,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Set how many products each page holds
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed the catalog with existing products
    #[must_use]
    pub fn with_products(self, products: impl IntoIterator<Item = Product>) -> Self {
        {
            let mut store = self.store();
            for product in products {
                store.next_id = store.next_id.max(product.id + 1);
                store.products.insert(product.id, product);
            }
        }
        self
    }

    /// Seed the catalog with `count` generated products, ids `1..=count`
    #[must_use]
    pub fn with_generated(self, count: u64) -> Self {
        self.with_products((1..=count).map(|id| Product {
            id,
            name: format!("Menu {id}"),
            description: String::new(),
            price: Some(Price::default()),
            image: None,
        }))
    }

    /// Always report one more page than the one requested
    #[must_use]
    pub const fn with_endless_pages(mut self) -> Self {
        self.endless_pages = true;
        self
    }

    /// Make the next call fail with the given status and message
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.store().failures.push_back((status, message.into()));
    }

    /// Make the next page request fail, leaving writes untouched
    pub fn fail_next_fetch(&self, status: u16, message: impl Into<String>) {
        self.store().fetch_failures.push_back((status, message.into()));
    }

    /// Number of page requests served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Current products in ascending id order
    pub fn products(&self) -> Vec<Product> {
        self.store().products.values().cloned().collect()
    }

    fn store(&self) -> MutexGuard<'_, CatalogStore> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn injected_failure(store: &mut CatalogStore) -> ClientResult<()> {
        match store.failures.pop_front() {
            Some((status, message)) => Err(ClientError::from_status(status, message)),
            None => Ok(()),
        }
    }
}

/// Check a draft the way the server does
fn check_draft(draft: &ProductDraft) -> ClientResult<Price> {
    if draft.name.trim().is_empty() {
        return Err(ClientError::validation("The name field is required."));
    }
    if draft.price.trim().is_empty() {
        return Err(ClientError::validation("The price field is required."));
    }
    Price::parse(&draft.price).map_err(|err| match err {
        storefront_core::Error::Validation { message, .. } if message.contains("negative") => {
            ClientError::validation("The price field must be at least 0.")
        }
        _ => ClientError::validation("The price field must be a number."),
    })
}

fn stored_image(id: ProductId, draft: &ProductDraft) -> Option<String> {
    draft
        .image
        .as_ref()
        .map(|image| format!("{id}-{}", image.file_name))
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn fetch_page(&self, page: u32) -> ClientResult<ProductPage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store();
        if let Some((status, message)) = store.fetch_failures.pop_front() {
            return Err(ClientError::from_status(status, message));
        }
        Self::injected_failure(&mut store)?;

        let total = store.products.len();
        let last_page = if self.endless_pages {
            page.saturating_add(1)
        } else {
            u32::try_from(total.div_ceil(self.page_size))
                .unwrap_or(u32::MAX)
                .max(1)
        };

        let skip = usize::try_from(page.max(1) - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.page_size);
        let data = store
            .products
            .values()
            .skip(skip)
            .take(self.page_size)
            .cloned()
            .collect();

        Ok(ProductPage {
            data,
            last_page,
            current_page: Some(page),
            per_page: u32::try_from(self.page_size).ok(),
            total: u64::try_from(total).ok(),
        })
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<ApiMessage> {
        let mut store = self.store();
        Self::injected_failure(&mut store)?;
        let price = check_draft(draft)?;

        let id = store.next_id;
        store.next_id += 1;
        store.products.insert(
            id,
            Product {
                id,
                name: draft.name.trim().to_string(),
                description: draft.description.clone(),
                price: Some(price),
                image: stored_image(id, draft),
            },
        );

        Ok(ApiMessage::new("Product created successfully"))
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> ClientResult<ApiMessage> {
        let mut store = self.store();
        Self::injected_failure(&mut store)?;
        let Some(product) = store.products.get_mut(&id) else {
            return Err(ClientError::not_found("Product not found"));
        };
        let price = check_draft(draft)?;

        product.name = draft.name.trim().to_string();
        product.description.clone_from(&draft.description);
        product.price = Some(price);
        if let Some(image) = stored_image(id, draft) {
            product.image = Some(image);
        }

        Ok(ApiMessage::new("Product updated successfully"))
    }

    async fn delete_product(&self, id: ProductId) -> ClientResult<ApiMessage> {
        let mut store = self.store();
        Self::injected_failure(&mut store)?;
        if store.products.remove(&id).is_none() {
            return Err(ClientError::not_found("Product not found"));
        }

        Ok(ApiMessage::new("Product deleted successfully"))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use storefront_core::ImageUpload;

    #[tokio::test]
    async fn test_pages_in_ascending_order() {
        let catalog = InMemoryCatalog::new().with_page_size(10).with_generated(24);

        let first = catalog.fetch_page(1).await.unwrap();
        let last = catalog.fetch_page(3).await.unwrap();

        assert_eq!(first.last_page, 3);
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.data[0].id, 1);
        assert_eq!(last.data.len(), 4);
        assert_eq!(last.data[3].id, 24);
        assert_eq!(catalog.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_reports_one_page() {
        let catalog = InMemoryCatalog::new();
        let page = catalog.fetch_page(1).await.unwrap();
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let catalog = InMemoryCatalog::new().with_generated(3);
        let draft = ProductDraft::new("Es Jeruk", "8000")
            .with_image(ImageUpload::new("jeruk.jpg", vec![1, 2]));

        let message = catalog.create_product(&draft).await.unwrap();
        assert_eq!(message.message, "Product created successfully");

        let products = catalog.products();
        let created = products.last().unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(created.image.as_deref(), Some("4-jeruk.jpg"));
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none_given() {
        let catalog = InMemoryCatalog::new();
        catalog
            .create_product(
                &ProductDraft::new("Es Jeruk", "8000")
                    .with_image(ImageUpload::new("jeruk.jpg", vec![1])),
            )
            .await
            .unwrap();

        catalog
            .update_product(1, &ProductDraft::new("Es Jeruk Besar", "10000"))
            .await
            .unwrap();

        let product = &catalog.products()[0];
        assert_eq!(product.name, "Es Jeruk Besar");
        assert_eq!(product.image.as_deref(), Some("1-jeruk.jpg"));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_validation_error() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .create_product(&ProductDraft::new("Es Jeruk", "mahal"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "The price field must be a number.");
        assert!(catalog.products().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let catalog = InMemoryCatalog::new().with_generated(2);
        match catalog.delete_product(7).await {
            Err(ClientError::NotFound { message }) => assert_eq!(message, "Product not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(catalog.products().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let catalog = InMemoryCatalog::new().with_generated(1);
        catalog.fail_next(503, "Service Unavailable");

        assert!(catalog.fetch_page(1).await.is_err());
        assert!(catalog.fetch_page(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_endless_pages() {
        let catalog = InMemoryCatalog::new().with_endless_pages();
        assert_eq!(catalog.fetch_page(41).await.unwrap().last_page, 42);
    }
}
