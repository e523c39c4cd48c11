//! Item category models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An item category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::types::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

/// Payload for creating or renaming a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct CategoryCreate {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Category> for CategoryCreate {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}
