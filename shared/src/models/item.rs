//! Catalog item models

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::StockLevel;
use crate::validation::validate_non_negative;

/// Category reference embedded in an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// A catalog item as returned by `GET /items/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Authoritative stock count; only the server changes it
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub buying_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_path: Option<String>,
    pub category: CategoryRef,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: NaiveDateTime,
}

impl Item {
    /// Stock level against the configured low stock threshold
    pub fn stock_level(&self, threshold: i64) -> StockLevel {
        StockLevel::classify(self.quantity, threshold)
    }

    /// Value of the stock on hand at buying price, saturating at the
    /// largest representable amount
    pub fn stock_value(&self) -> Decimal {
        self.buying_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Payload for `POST /items/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ItemCreate {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
    #[validate(custom = "validate_non_negative")]
    #[serde(with = "rust_decimal::serde::float")]
    pub buying_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Please select a category"))]
    pub category_id: i64,
}

impl ItemCreate {
    /// Trims the name and drops a blank description before submission
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }
}

impl From<&Item> for ItemCreate {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            buying_price: item.buying_price,
            selling_price: item.selling_price,
            description: item.description.clone(),
            category_id: item.category.id,
        }
    }
}

/// Payload for `PUT /items/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct ItemUpdate {
    #[validate(length(min = 1, message = "Item name is required"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[validate(custom = "validate_non_negative")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub buying_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub selling_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Please select a category"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl From<ItemCreate> for ItemUpdate {
    fn from(form: ItemCreate) -> Self {
        Self {
            name: Some(form.name),
            quantity: Some(form.quantity),
            buying_price: Some(form.buying_price),
            selling_price: Some(form.selling_price),
            description: form.description,
            category_id: Some(form.category_id),
        }
    }
}
