//! Catalog handlers
//!
//! Writes accept `multipart/form-data` with `name`, `description`, `price`
//! and an optional `image` file, the same body the Catalog API takes.

use crate::{error::ApiError, state::AppState};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_client::{
    CatalogSnapshot, Mutation, Notice, Operation, ProductForm, RefreshOutcome,
};
use storefront_core::{ImageUpload, ProductId};
use tracing::info;

/// Catalog view plus what a front end needs to show images
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Controller state
    #[serde(flatten)]
    pub snapshot: CatalogSnapshot,
    /// Base URL product image filenames resolve against
    pub image_base_url: String,
}

/// Result of a successful write
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Notice to show
    pub notice: Notice,
    /// Whether the follow-up refresh replaced the list
    pub refreshed: bool,
}

impl MutationResponse {
    fn saved(mutation: Mutation) -> Self {
        Self {
            notice: Notice::saved(mutation.message),
            refreshed: mutation.refreshed,
        }
    }

    fn deleted(mutation: Mutation) -> Self {
        Self {
            notice: Notice::deleted(mutation.message),
            refreshed: mutation.refreshed,
        }
    }
}

/// Query parameters for delete
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    /// Set once the user accepted the prompt
    #[serde(default)]
    pub confirm: bool,
}

/// Current catalog state
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        snapshot: state.catalog.snapshot().await,
        image_base_url: state.config.catalog.image_base_url(),
    })
}

/// Re-fetch the full listing
pub async fn refresh_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    state
        .catalog
        .refresh()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_client(Operation::Refresh, &e))
}

/// Create a product
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let form = read_form(multipart).await?;
    let mutation = state
        .catalog
        .create(&form.to_draft())
        .await
        .map_err(|e| ApiError::from_client(Operation::Save, &e))?;

    Ok((StatusCode::CREATED, Json(MutationResponse::saved(mutation))))
}

/// Update a product
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<MutationResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let mutation = state
        .catalog
        .update(id, &form.to_draft())
        .await
        .map_err(|e| ApiError::from_client(Operation::Save, &e))?;

    Ok(Json(MutationResponse::saved(mutation)))
}

/// Delete a product; answers 428 with the prompt until `confirm=true` is sent
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<MutationResponse>, ApiError> {
    let pending = state.catalog.request_delete(id);
    if !params.confirm {
        info!(id, "Delete awaiting confirmation");
        return Err(ApiError::confirmation_required());
    }

    let mutation = state
        .catalog
        .delete(pending.confirm())
        .await
        .map_err(|e| ApiError::from_client(Operation::Delete, &e))?;

    Ok(Json(MutationResponse::deleted(mutation)))
}

/// Open the add form
pub async fn open_add_form(State(state): State<Arc<AppState>>) -> Json<ProductForm> {
    Json(state.catalog.begin_add().await)
}

/// Open the edit form for a listed product
pub async fn open_edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductForm>, ApiError> {
    state
        .catalog
        .begin_edit(id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_client(Operation::Save, &e))
}

/// Close the open form
pub async fn close_form(State(state): State<Arc<AppState>>) -> StatusCode {
    state.catalog.close_editor().await;
    StatusCode::NO_CONTENT
}

/// Save the open form as a create or an update
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<MutationResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let mutation = state
        .catalog
        .submit(&form)
        .await
        .map_err(|e| ApiError::from_client(Operation::Save, &e))?;

    Ok(Json(MutationResponse::saved(mutation)))
}

/// Collect product fields from a multipart body
async fn read_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ApiError::bad_request(format!("Invalid form data: {e}"))
    };

    let mut form = ProductForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid)?;
                // browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    let mut upload = ImageUpload::new(file_name, bytes.to_vec());
                    if content_type.is_some() {
                        upload.content_type = content_type;
                    }
                    form.image = Some(upload);
                }
            }
            "name" => form.name = field.text().await.map_err(invalid)?,
            "description" => form.description = field.text().await.map_err(invalid)?,
            "price" => form.price = field.text().await.map_err(invalid)?,
            _ => {}
        }
    }

    Ok(form)
}
