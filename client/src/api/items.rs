//! Catalog item endpoints

use serde::de::IgnoredAny;
use shared::{Item, ItemCreate, ItemUpdate};

use super::ApiGateway;
use crate::error::ClientResult;

impl ApiGateway {
    pub async fn list_items(&self) -> ClientResult<Vec<Item>> {
        self.get("/items/").await
    }

    pub async fn get_item(&self, id: i64) -> ClientResult<Item> {
        self.get(&format!("/items/{}", id)).await
    }

    pub async fn create_item(&self, item: &ItemCreate) -> ClientResult<Item> {
        self.post_json("/items/", item).await
    }

    pub async fn update_item(&self, id: i64, update: &ItemUpdate) -> ClientResult<Item> {
        self.put_json(&format!("/items/{}", id), update).await
    }

    pub async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/items/{}", id)).await?;
        Ok(())
    }

    /// PNG of the item's QR code
    pub async fn item_qr_code(&self, id: i64) -> ClientResult<Vec<u8>> {
        self.get_bytes(&format!("/items/{}/qr-code", id)).await
    }

    /// Find an item by model number in a fresh catalog snapshot
    pub async fn search_by_model(&self, model_number: &str) -> ClientResult<Option<Item>> {
        let items = self.list_items().await?;
        Ok(items.into_iter().find(|item| item.model_number == model_number))
    }
}
