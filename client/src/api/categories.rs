//! Category endpoints

use serde::de::IgnoredAny;
use shared::{Category, CategoryCreate};

use super::ApiGateway;
use crate::error::ClientResult;

impl ApiGateway {
    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.get("/categories/").await
    }

    pub async fn get_category(&self, id: i64) -> ClientResult<Category> {
        self.get(&format!("/categories/{}", id)).await
    }

    pub async fn create_category(&self, category: &CategoryCreate) -> ClientResult<Category> {
        self.post_json("/categories/", category).await
    }

    pub async fn update_category(&self, id: i64, category: &CategoryCreate) -> ClientResult<Category> {
        self.put_json(&format!("/categories/{}", id), category).await
    }

    pub async fn delete_category(&self, id: i64) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/categories/{}", id))
            .await?;
        Ok(())
    }
}
