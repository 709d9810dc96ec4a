//! Product add/edit form state

use serde::{Deserialize, Serialize};
use storefront_core::{ImageUpload, Product, ProductDraft};

/// Which form, if any, is open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "product", rename_all = "snake_case")]
pub enum EditorState {
    /// No form open
    #[default]
    Closed,
    /// Adding a new product
    Adding,
    /// Editing an existing product
    Editing(Product),
}

impl EditorState {
    /// Whether a form is open
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Form fields as the user edits them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    /// Product name
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Price as typed
    #[serde(default)]
    pub price: String,

    /// Newly chosen image
    #[serde(skip)]
    pub image: Option<ImageUpload>,

    /// Server-side image currently attached, shown as a preview
    #[serde(default, skip_deserializing)]
    pub current_image: Option<String>,
}

impl ProductForm {
    /// Form prefilled from a loaded product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.as_ref().map_or_else(String::new, ToString::to_string),
            image: None,
            current_image: product.image.clone(),
        }
    }

    /// Write payload for this form
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            image: self.image.clone(),
        }
    }
}
