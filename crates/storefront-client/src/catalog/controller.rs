//! Catalog sync controller
//!
//! Holds the locally materialized product list and mediates every write
//! through refresh-after-write: a successful create, update or delete is
//! followed by a full re-fetch of the listing.

use crate::catalog::api::CatalogApi;
use crate::catalog::deletion::{ConfirmedDeletion, PendingDeletion};
use crate::catalog::editor::{EditorState, ProductForm};
use crate::catalog::http::HttpCatalogApi;
use crate::catalog::pagination::{fetch_all_pages, into_snapshot};
use crate::error::{ClientError, ClientResult};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use storefront_core::{ApiMessage, CatalogConfig, Product, ProductDraft, ProductId};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Result of one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The fetched listing replaced the local list
    Applied {
        /// Generation the refresh ran as
        generation: u64,
        /// Products now held
        count: usize,
    },
    /// A newer refresh had already been applied; this one was dropped
    Discarded {
        /// Generation the refresh ran as
        generation: u64,
    },
}

/// Result of a successful create, update or delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    /// Server message
    pub message: String,
    /// Whether the follow-up refresh replaced the local list
    pub refreshed: bool,
}

/// Point-in-time view of the controller for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    /// Products sorted by id, newest first
    pub products: Vec<Product>,
    /// Whether any refresh is in flight
    pub is_loading: bool,
    /// Why the most recent refresh failed, until a later one succeeds
    pub last_error: Option<String>,
    /// Open form, if any
    pub editor: EditorState,
}

#[derive(Debug)]
struct RefreshFailure {
    generation: u64,
    message: String,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<Product>,
    applied_generation: u64,
    last_error: Option<RefreshFailure>,
    editor: EditorState,
}

/// Marks a refresh as in flight until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Keeps a fully paginated copy of the remote catalog
pub struct CatalogController {
    api: Arc<dyn CatalogApi>,
    max_pages: u32,
    generation: AtomicU64,
    in_flight: AtomicUsize,
    state: RwLock<CatalogState>,
}

impl std::fmt::Debug for CatalogController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogController")
            .field("api", &self.api.name())
            .field("max_pages", &self.max_pages)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CatalogController {
    /// Create a controller over any Catalog API implementation
    pub fn new(api: Arc<dyn CatalogApi>, max_pages: u32) -> Self {
        Self {
            api,
            max_pages: max_pages.max(1),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Create a controller talking HTTP to the configured Catalog API
    pub fn from_config(config: &CatalogConfig) -> ClientResult<Self> {
        let api = HttpCatalogApi::from_config(config)?;
        Ok(Self::new(Arc::new(api), config.max_pages))
    }

    /// Re-fetch every page and replace the local list
    ///
    /// On failure the local list keeps its previous contents and the error
    /// is recorded for [`CatalogSnapshot::last_error`].
    pub async fn refresh(&self) -> ClientResult<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!(generation, backend = self.api.name(), "Refreshing catalog");

        let result = fetch_all_pages(self.api.as_ref(), self.max_pages).await;
        let mut state = self.state.write().await;

        match result {
            Ok(products) => {
                if generation <= state.applied_generation {
                    debug!(
                        generation,
                        applied = state.applied_generation,
                        "Discarding stale catalog refresh"
                    );
                    return Ok(RefreshOutcome::Discarded { generation });
                }

                state.products = into_snapshot(products);
                state.applied_generation = generation;
                if state
                    .last_error
                    .as_ref()
                    .is_some_and(|failure| failure.generation < generation)
                {
                    state.last_error = None;
                }

                let count = state.products.len();
                info!(generation, count, "Catalog refreshed");
                Ok(RefreshOutcome::Applied { generation, count })
            }
            Err(err) => {
                error!(generation, error = %err, "Catalog refresh failed");
                let newest = generation > state.applied_generation
                    && state
                        .last_error
                        .as_ref()
                        .is_none_or(|failure| failure.generation < generation);
                if newest {
                    state.last_error = Some(RefreshFailure {
                        generation,
                        message: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Create a product, then refresh
    pub async fn create(&self, draft: &ProductDraft) -> ClientResult<Mutation> {
        draft.validate()?;
        let response = self.api.create_product(draft).await.inspect_err(|err| {
            warn!(name = %draft.name, error = %err, "Product create failed");
        })?;
        info!(name = %draft.name, "Product created");
        Ok(self.after_write(response).await)
    }

    /// Update a product, then refresh
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> ClientResult<Mutation> {
        draft.validate()?;
        let response = self.api.update_product(id, draft).await.inspect_err(|err| {
            warn!(id, error = %err, "Product update failed");
        })?;
        info!(id, "Product updated");
        Ok(self.after_write(response).await)
    }

    /// Ask to delete a product; nothing is sent until the returned prompt is confirmed
    pub fn request_delete(&self, id: ProductId) -> PendingDeletion {
        debug!(id, backend = self.api.name(), "Delete requested");
        PendingDeletion::new(id)
    }

    /// Delete a confirmed product, then refresh
    pub async fn delete(&self, confirmed: ConfirmedDeletion) -> ClientResult<Mutation> {
        let ConfirmedDeletion { id } = confirmed;
        let response = self.api.delete_product(id).await.inspect_err(|err| {
            warn!(id, error = %err, "Product delete failed");
        })?;
        info!(id, "Product deleted");
        Ok(self.after_write(response).await)
    }

    async fn after_write(&self, response: ApiMessage) -> Mutation {
        let refreshed = match self.refresh().await {
            Ok(RefreshOutcome::Applied { .. }) => true,
            Ok(RefreshOutcome::Discarded { .. }) => false,
            Err(err) => {
                warn!(error = %err, "Refresh after write failed");
                false
            }
        };

        Mutation {
            message: response.message,
            refreshed,
        }
    }

    /// Open an empty form for a new product
    pub async fn begin_add(&self) -> ProductForm {
        self.state.write().await.editor = EditorState::Adding;
        ProductForm::default()
    }

    /// Open a form prefilled from a product in the local list
    pub async fn begin_edit(&self, id: ProductId) -> ClientResult<ProductForm> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or(ClientError::UnknownProduct { id })?;

        let form = ProductForm::from_product(&product);
        state.editor = EditorState::Editing(product);
        Ok(form)
    }

    /// Discard the open form
    pub async fn close_editor(&self) {
        self.state.write().await.editor = EditorState::Closed;
    }

    /// Save the open form; the form closes only on success
    pub async fn submit(&self, form: &ProductForm) -> ClientResult<Mutation> {
        let editor = self.state.read().await.editor.clone();
        let draft = form.to_draft();

        let mutation = match &editor {
            EditorState::Closed => return Err(ClientError::EditorClosed),
            EditorState::Adding => self.create(&draft).await?,
            EditorState::Editing(product) => self.update(product.id, &draft).await?,
        };

        // another form may have been opened while the write was in flight
        let mut state = self.state.write().await;
        if state.editor == editor {
            state.editor = EditorState::Closed;
        } else {
            debug!("Editor changed during submit, leaving it open");
        }
        drop(state);

        Ok(mutation)
    }

    /// Current form state
    pub async fn editor(&self) -> EditorState {
        self.state.read().await.editor.clone()
    }

    /// Products currently held, newest first
    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    /// Look up a product in the local list
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.state
            .read()
            .await
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned()
    }

    /// Whether any refresh is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Copy of everything the presentation layer shows
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        CatalogSnapshot {
            products: state.products.clone(),
            is_loading: self.is_loading(),
            last_error: state.last_error.as_ref().map(|failure| failure.message.clone()),
            editor: state.editor.clone(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::unreachable
)]
mod tests {
    use super::*;
    use crate::catalog::memory::InMemoryCatalog;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use storefront_core::{Price, ProductPage};
    use tokio::sync::{Mutex, oneshot};

    fn controller_with(catalog: InMemoryCatalog) -> (Arc<InMemoryCatalog>, CatalogController) {
        let catalog = Arc::new(catalog);
        let controller = CatalogController::new(catalog.clone(), 500);
        (catalog, controller)
    }

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|product| product.id).collect()
    }

    #[tokio::test]
    async fn test_refresh_collects_all_pages_descending() {
        let (catalog, controller) =
            controller_with(InMemoryCatalog::new().with_page_size(10).with_generated(24));

        let outcome = controller.refresh().await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Applied { generation: 1, count: 24 });
        assert_eq!(catalog.fetch_count(), 3);
        let products = controller.products().await;
        assert_eq!(products.first().map(|p| p.id), Some(24));
        assert_eq!(products.last().map(|p| p.id), Some(1));
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let (_, controller) = controller_with(InMemoryCatalog::new().with_generated(13));

        controller.refresh().await.unwrap();
        let first = controller.products().await;
        controller.refresh().await.unwrap();

        assert_eq!(controller.products().await, first);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_list_and_records_error() {
        let (catalog, controller) = controller_with(InMemoryCatalog::new().with_generated(3));
        controller.refresh().await.unwrap();

        catalog.fail_next(500, "Server Error");
        assert!(controller.refresh().await.is_err());

        let snapshot = controller.snapshot().await;
        assert_eq!(ids(&snapshot.products), vec![3, 2, 1]);
        assert!(snapshot.last_error.unwrap().contains("500"));

        controller.refresh().await.unwrap();
        assert!(controller.snapshot().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_create_then_refresh_shows_new_product() {
        let (_, controller) = controller_with(InMemoryCatalog::new().with_generated(2));
        controller.refresh().await.unwrap();

        let mutation = controller
            .create(&ProductDraft::new("Gado-gado", "20000"))
            .await
            .unwrap();

        assert_eq!(mutation.message, "Product created successfully");
        assert!(mutation.refreshed);
        let products = controller.products().await;
        assert_eq!(products[0].id, 3);
        assert_eq!(products[0].name, "Gado-gado");
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let (catalog, controller) = controller_with(InMemoryCatalog::new());

        let err = controller
            .create(&ProductDraft::new("", "20000"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(catalog.products().is_empty());
        assert_eq!(catalog.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_server_validation_message_unchanged() {
        let (catalog, controller) = controller_with(InMemoryCatalog::new());
        catalog.fail_next(422, "The image must be an image.");

        let err = controller
            .create(&ProductDraft::new("Pecel", "12000"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "The image must be an image.");
    }

    #[tokio::test]
    async fn test_delete_not_found_leaves_list() {
        let (catalog, controller) = controller_with(InMemoryCatalog::new().with_generated(3));
        controller.refresh().await.unwrap();
        let fetches = catalog.fetch_count();

        let pending = controller.request_delete(7);
        match controller.delete(pending.confirm()).await {
            Err(ClientError::NotFound { message }) => assert_eq!(message, "Product not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        assert_eq!(ids(&controller.products().await), vec![3, 2, 1]);
        assert_eq!(catalog.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_delete_removes_after_refresh() {
        let (_, controller) = controller_with(InMemoryCatalog::new().with_generated(3));
        controller.refresh().await.unwrap();

        let mutation = controller
            .delete(controller.request_delete(2).confirm())
            .await
            .unwrap();

        assert_eq!(mutation.message, "Product deleted successfully");
        assert_eq!(ids(&controller.products().await), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_write_succeeds_even_if_refresh_fails() {
        let (catalog, controller) = controller_with(InMemoryCatalog::new().with_generated(1));
        controller.refresh().await.unwrap();
        catalog.fail_next_fetch(503, "Service Unavailable");

        let mutation = controller
            .delete(controller.request_delete(1).confirm())
            .await
            .unwrap();

        assert!(!mutation.refreshed);
        assert!(catalog.products().is_empty());
        let snapshot = controller.snapshot().await;
        assert_eq!(ids(&snapshot.products), vec![1]);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_editor_add_and_edit() {
        let (_, controller) = controller_with(InMemoryCatalog::new().with_generated(2));
        controller.refresh().await.unwrap();

        let mut form = controller.begin_add().await;
        assert_eq!(controller.editor().await, EditorState::Adding);
        form.name = "Tahu Telur".to_string();
        form.price = "14000".to_string();
        controller.submit(&form).await.unwrap();
        assert_eq!(controller.editor().await, EditorState::Closed);

        let mut form = controller.begin_edit(3).await.unwrap();
        assert_eq!(form.name, "Tahu Telur");
        form.price = "15000".to_string();
        controller.submit(&form).await.unwrap();

        let edited = controller.product(3).await.unwrap();
        assert_eq!(edited.price, Some(Price::parse("15000").unwrap()));
    }

    #[tokio::test]
    async fn test_editor_stays_open_on_failure() {
        let (_, controller) = controller_with(InMemoryCatalog::new());
        let form = controller.begin_add().await;

        assert!(controller.submit(&form).await.is_err());
        assert_eq!(controller.editor().await, EditorState::Adding);

        controller.close_editor().await;
        assert!(matches!(
            controller.submit(&form).await,
            Err(ClientError::EditorClosed)
        ));
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_product() {
        let (_, controller) = controller_with(InMemoryCatalog::new());
        assert!(matches!(
            controller.begin_edit(5).await,
            Err(ClientError::UnknownProduct { id: 5 })
        ));
    }

    /// Catalog whose page requests block until the test releases them, in call order
    struct GatedCatalog {
        gates: Mutex<VecDeque<oneshot::Receiver<ProductPage>>>,
    }

    #[async_trait]
    impl CatalogApi for GatedCatalog {
        async fn fetch_page(&self, _page: u32) -> ClientResult<ProductPage> {
            let gate = self
                .gates
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| ClientError::configuration("no gate left"))?;
            gate.await
                .map_err(|_| ClientError::configuration("gate dropped"))
        }

        async fn create_product(&self, _draft: &ProductDraft) -> ClientResult<ApiMessage> {
            Ok(ApiMessage::new("Product created successfully"))
        }

        async fn update_product(
            &self,
            _id: ProductId,
            _draft: &ProductDraft,
        ) -> ClientResult<ApiMessage> {
            unreachable!("not used")
        }

        async fn delete_product(&self, _id: ProductId) -> ClientResult<ApiMessage> {
            unreachable!("not used")
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    fn single_page(ids: &[u64]) -> ProductPage {
        ProductPage {
            data: ids
                .iter()
                .map(|&id| Product {
                    id,
                    name: format!("Menu {id}"),
                    description: String::new(),
                    price: Some(Price::default()),
                    image: None,
                })
                .collect(),
            last_page: 1,
            current_page: Some(1),
            per_page: None,
            total: None,
        }
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        let api = GatedCatalog {
            gates: Mutex::new(VecDeque::from([older_rx, newer_rx])),
        };
        let controller = Arc::new(CatalogController::new(Arc::new(api), 10));

        let older = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.refresh().await }
        });
        tokio::task::yield_now().await;

        let newer = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.refresh().await }
        });
        tokio::task::yield_now().await;
        assert!(controller.snapshot().await.is_loading);

        newer_tx.send(single_page(&[1, 2, 3])).unwrap();
        assert_eq!(
            newer.await.unwrap().unwrap(),
            RefreshOutcome::Applied { generation: 2, count: 3 }
        );

        older_tx.send(single_page(&[1])).unwrap();
        assert_eq!(
            older.await.unwrap().unwrap(),
            RefreshOutcome::Discarded { generation: 1 }
        );

        let snapshot = controller.snapshot().await;
        assert_eq!(ids(&snapshot.products), vec![3, 2, 1]);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_submit_leaves_a_newer_form_open() {
        let (initial_tx, initial_rx) = oneshot::channel();
        let (after_write_tx, after_write_rx) = oneshot::channel();
        let api = GatedCatalog {
            gates: Mutex::new(VecDeque::from([initial_rx, after_write_rx])),
        };
        let controller = Arc::new(CatalogController::new(Arc::new(api), 10));

        initial_tx.send(single_page(&[1, 2])).unwrap();
        controller.refresh().await.unwrap();

        let mut form = controller.begin_add().await;
        form.name = "Es Campur".to_string();
        form.price = "12000".to_string();
        let submit = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit(&form).await }
        });
        tokio::task::yield_now().await;

        controller.begin_edit(2).await.unwrap();
        after_write_tx.send(single_page(&[1, 2, 3])).unwrap();
        assert!(submit.await.unwrap().unwrap().refreshed);

        match controller.editor().await {
            EditorState::Editing(product) => assert_eq!(product.id, 2),
            other => panic!("expected the edit form to stay open, got {other:?}"),
        }
    }
}
