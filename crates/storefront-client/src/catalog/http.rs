//! HTTP client for the Catalog API

use crate::catalog::api::CatalogApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use std::time::Duration;
use storefront_core::{ApiMessage, CatalogConfig, ProductDraft, ProductId, ProductPage, UpdateTransport};
use tracing::{debug, warn};

/// Catalog API client over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    update_transport: UpdateTransport,
}

impl HttpCatalogApi {
    /// Create a client with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            update_transport: UpdateTransport::default(),
        }
    }

    /// Create a client from catalog configuration
    pub fn from_config(config: &CatalogConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            update_transport: config.update_transport,
        })
    }

    /// Choose how updates are sent
    #[must_use]
    pub const fn with_update_transport(mut self, transport: UpdateTransport) -> Self {
        self.update_transport = transport;
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/api/products", self.base_url)
    }

    fn product_url(&self, id: ProductId) -> String {
        format!("{}/api/products/{id}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> ClientResult<Response> {
        let response = request.header(header::ACCEPT, "application/json").send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        warn!(status = status.as_u16(), message = %message, "Catalog API request failed");
        Err(ClientError::from_status(status.as_u16(), message))
    }

    /// Message of an accepted write; the status alone decides success
    async fn read_message(response: Response) -> ApiMessage {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Failed to read write response body");
                return ApiMessage::default();
            }
        };

        let body = body.trim();
        if body.is_empty() {
            return ApiMessage::default();
        }
        serde_json::from_str(body).unwrap_or_else(|e| {
            warn!(status = status.as_u16(), error = %e, "Write response body is not JSON");
            ApiMessage::new(body)
        })
    }
}

/// User-facing text for a failed request
///
/// Prefers the body's `message`, then its first field error. A body that is
/// not JSON is used as-is; an empty or uninformative one yields the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    match serde_json::from_str::<ApiMessage>(body) {
        Ok(parsed) => parsed.summary(),
        Err(_) => Some(body.to_string()).filter(|body| !body.is_empty()),
    }
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

/// Multipart body for a create or update
fn draft_form(draft: &ProductDraft) -> ClientResult<Form> {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("price", draft.price.trim().to_string());

    if let Some(image) = &draft.image {
        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part("image", part);
    }

    Ok(form)
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_page(&self, page: u32) -> ClientResult<ProductPage> {
        debug!(page, "Fetching product page");
        let request = self.client.get(self.products_url()).query(&[("page", page)]);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<ApiMessage> {
        debug!(name = %draft.name, "Creating product");
        let request = self.client.post(self.products_url()).multipart(draft_form(draft)?);
        Ok(Self::read_message(Self::send(request).await?).await)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> ClientResult<ApiMessage> {
        debug!(id, transport = ?self.update_transport, "Updating product");
        let form = draft_form(draft)?;
        let request = match self.update_transport {
            UpdateTransport::MethodOverride => self
                .client
                .post(self.product_url(id))
                .multipart(form.text("_method", "PUT")),
            UpdateTransport::NativePut => self.client.put(self.product_url(id)).multipart(form),
        };
        Ok(Self::read_message(Self::send(request).await?).await)
    }

    async fn delete_product(&self, id: ProductId) -> ClientResult<ApiMessage> {
        debug!(id, "Deleting product");
        let request = self.client.delete(self.product_url(id));
        Ok(Self::read_message(Self::send(request).await?).await)
    }

    fn name(&self) -> &str {
        "http"
    }
}
