//! The catalog entity and its write-side input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single catalog item.
///
/// `id` is `None` until the store assigns one on the first save; after that it never changes.
/// `created_at` is fixed at creation and preserved by every later update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a not-yet-persisted product stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        quantity: i32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            price,
            quantity,
            created_at: Utc::now(),
        }
    }
}

/// Create/update payload. `id` present means "update that product".
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl ProductForm {
    /// Checks the form and collects every violation rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Product name is required"));
        }
        if self.category.trim().is_empty() {
            errors.push(FieldError::new("category", "Category is required"));
        }
        if self.price < Decimal::ZERO {
            errors.push(FieldError::new("price", "Price must not be negative"));
        }
        if self.quantity < 0 {
            errors.push(FieldError::new("quantity", "Quantity must not be negative"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Converts a validated form into an entity ready for `save`.
    ///
    /// For updates the timestamp set here is ignored by the store, which keeps the original.
    pub fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.price,
            quantity: self.quantity,
            created_at: Utc::now(),
        }
    }
}
