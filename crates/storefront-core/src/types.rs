//! Core data types for the product catalog

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Product identifier, assigned by the Catalog API
pub type ProductId = u64;

/// Non-negative product price
///
/// Travels as text (`"15000.00"`) but is also accepted as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Parse a price from its text form
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is empty, not a number, or negative.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("price", "is required"));
        }

        let amount = Decimal::from_str(trimmed)
            .map_err(|_| Error::validation("price", format!("'{trimmed}' is not a number")))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::validation("price", "must not be negative"));
        }

        Ok(Self(amount.abs()))
    }

    /// The exact decimal amount
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Storefront display form, e.g. `Rp.15000`
    pub fn display_rupiah(self) -> String {
        format!("Rp.{}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(text) => text,
            RawPrice::Number(number) => number.to_string(),
        };

        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// A product as held by the Catalog API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Free-form description, empty when the server has none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    /// Unit price; `None` when the server sent no readable price
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,

    /// Server-side image filename
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Resolve the product image against the catalog's image base URL
    pub fn image_url(&self, image_base_url: &str) -> Option<String> {
        self.image
            .as_deref()
            .filter(|image| !image.is_empty())
            .map(|image| format!("{}/{image}", image_base_url.trim_end_matches('/')))
    }
}

/// Listing rows keep loading when their price is missing or malformed
fn lenient_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Price>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        serde_json::Value::String(text) => Price::parse(&text).ok(),
        serde_json::Value::Number(number) => Price::parse(&number.to_string()).ok(),
        _ => None,
    }))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the product listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page
    pub data: Vec<Product>,

    /// Index of the last page reported by the server
    #[serde(default = "default_last_page")]
    pub last_page: u32,

    /// Index of this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,

    /// Page size used by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// Total number of products across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

const fn default_last_page() -> u32 {
    1
}

/// `{ "message": ..., "errors": ... }` body carried by write responses and error bodies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable message from the server
    #[serde(default)]
    pub message: String,

    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiMessage {
    /// Message without field errors
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Text worth showing a user: the message, else the first field error
    pub fn summary(&self) -> Option<String> {
        Some(self.message.trim())
            .filter(|message| !message.is_empty())
            .or_else(|| {
                self.errors
                    .values()
                    .flatten()
                    .map(|error| error.trim())
                    .find(|error| !error.is_empty())
            })
            .map(str::to_string)
    }
}

/// Image file staged for upload
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,

    /// MIME type, if known
    pub content_type: Option<String>,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Stage an image, guessing its MIME type from the file extension
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_image_type(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_image_type(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Write payload for creating or updating a product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    /// Product name, required
    pub name: String,

    /// Description, may be empty
    pub description: String,

    /// Price as entered, must parse to a non-negative number
    pub price: String,

    /// New image; `None` keeps the existing image on update
    pub image: Option<ImageUpload>,
}

impl ProductDraft {
    /// Create a draft with the required fields
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach an image upload
    #[must_use]
    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Check the draft before it is sent, returning the parsed price
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<Price> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name", "is required"));
        }
        Price::parse(&self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("15000", "15000")]
    #[case("15000.50", "15000.50")]
    #[case(" 25000 ", "25000")]
    #[case("0", "0")]
    #[case("-0", "0")]
    fn test_price_parse_accepts(#[case] input: &str, #[case] expected: &str) {
        let price = Price::parse(input).unwrap();
        assert_eq!(price.to_string(), expected);
    }

    #[rstest]
    #[case("", "is required")]
    #[case("   ", "is required")]
    #[case("abc", "is not a number")]
    #[case("-1", "must not be negative")]
    fn test_price_parse_rejects(#[case] input: &str, #[case] expected: &str) {
        match Price::parse(input) {
            Err(Error::Validation { field, message }) => {
                assert_eq!(field, "price");
                assert!(message.contains(expected), "unexpected message: {message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_price_display_rupiah() {
        let price = Price::parse("12000").unwrap();
        assert_eq!(price.display_rupiah(), "Rp.12000");
    }

    #[test]
    fn test_product_deserializes_laravel_shape() {
        let json = r#"{
            "id": 12,
            "name": "Nasi Goreng",
            "description": null,
            "price": "25000.00",
            "image": "1700000000.jpg",
            "created_at": "2024-01-01T00:00:00.000000Z",
            "updated_at": "2024-01-01T00:00:00.000000Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 12);
        assert_eq!(product.description, "");
        assert_eq!(product.price.unwrap().to_string(), "25000.00");
        assert_eq!(product.image.as_deref(), Some("1700000000.jpg"));
    }

    #[test]
    fn test_product_price_accepts_json_number() {
        let json = r#"{"id": 3, "name": "Es Teh", "description": "Iced tea", "price": 5000}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.price, Some(Price::parse("5000").unwrap()));
        assert!(product.image.is_none());
    }

    #[rstest]
    #[case("null")]
    #[case(r#""-5""#)]
    #[case(r#""gratis""#)]
    #[case("true")]
    fn test_product_with_unreadable_price_still_loads(#[case] price: &str) {
        let json = format!(r#"{{"id": 3, "name": "Es Teh", "price": {price}}}"#);
        let product: Product = serde_json::from_str(&json).unwrap();

        assert_eq!(product.id, 3);
        assert!(product.price.is_none());
    }

    #[test]
    fn test_page_with_mixed_prices_keeps_every_row() {
        let json = r#"{"data": [
            {"id": 3, "name": "Rendang", "price": "15000.00"},
            {"id": 2, "name": "Gado-gado", "price": null},
            {"id": 1, "name": "Bakso", "price": "20000.00"}
        ], "last_page": 1}"#;

        let page: ProductPage = serde_json::from_str(json).unwrap();
        let prices: Vec<_> = page.data.iter().map(|product| product.price.as_ref().map(ToString::to_string)).collect();
        assert_eq!(
            prices,
            vec![Some("15000.00".to_string()), None, Some("20000.00".to_string())]
        );
    }

    #[test]
    fn test_price_itself_stays_strict() {
        assert!(serde_json::from_str::<Price>(r#""-5""#).is_err());
        assert!(serde_json::from_str::<Price>("null").is_err());
    }

    #[test]
    fn test_price_serializes_as_text() {
        let price = Price::parse("7500.25").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), r#""7500.25""#);
    }

    #[test]
    fn test_image_url() {
        let mut product = Product {
            id: 1,
            name: "Sate".to_string(),
            description: String::new(),
            price: Some(Price::parse("30000").unwrap()),
            image: Some("sate.png".to_string()),
        };

        assert_eq!(
            product.image_url("http://127.0.0.1:8000/assets/images/").as_deref(),
            Some("http://127.0.0.1:8000/assets/images/sate.png")
        );

        product.image = Some(String::new());
        assert!(product.image_url("http://127.0.0.1:8000/assets/images").is_none());
    }

    #[test]
    fn test_page_defaults_last_page() {
        let page: ProductPage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
        assert!(page.total.is_none());
    }

    #[test]
    fn test_api_message_tolerates_missing_message() {
        let message: ApiMessage = serde_json::from_str(r#"{"errors": {}}"#).unwrap();
        assert_eq!(message.message, "");
        assert!(message.summary().is_none());
    }

    #[test]
    fn test_api_message_summary_prefers_message_then_field_errors() {
        let message: ApiMessage = serde_json::from_str(
            r#"{"message": "The given data was invalid.", "errors": {"name": ["The name field is required."]}}"#,
        )
        .unwrap();
        assert_eq!(message.summary().as_deref(), Some("The given data was invalid."));

        let message: ApiMessage =
            serde_json::from_str(r#"{"errors": {"price": ["The price field must be a number."]}}"#)
                .unwrap();
        assert_eq!(message.summary().as_deref(), Some("The price field must be a number."));
    }

    #[test]
    fn test_draft_validation() {
        let draft = ProductDraft::new("Mie Ayam", "18000").with_description("Chicken noodles");
        assert_eq!(draft.validate().unwrap().to_string(), "18000");

        let nameless = ProductDraft::new("  ", "18000");
        match nameless.validate() {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected name validation error, got {other:?}"),
        }

        let priceless = ProductDraft::new("Mie Ayam", "");
        assert!(matches!(
            priceless.validate(),
            Err(Error::Validation { field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_image_upload_guesses_content_type() {
        let jpeg = ImageUpload::new("photo.JPG", vec![0xFF, 0xD8]);
        assert_eq!(jpeg.content_type.as_deref(), Some("image/jpeg"));

        let unknown = ImageUpload::new("notes", vec![1, 2, 3]);
        assert!(unknown.content_type.is_none());
        assert!(format!("{unknown:?}").contains("len: 3"));
    }

    proptest! {
        #[test]
        fn prop_price_keeps_exact_text(whole in 0u64..100_000_000, cents in 0u32..100) {
            let text = format!("{whole}.{cents:02}");
            let price = Price::parse(&text).unwrap();
            prop_assert_eq!(price.to_string(), text);
            prop_assert_eq!(price.display_rupiah(), format!("Rp.{whole}.{cents:02}"));
        }

        #[test]
        fn prop_negative_price_rejected(whole in 1u64..100_000_000) {
            let text = format!("-{whole}");
            prop_assert!(Price::parse(&text).is_err());
        }
    }
}
