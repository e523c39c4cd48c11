//! REST API access
//!
//! [`ApiGateway`] is the single choke point for HTTP. The narrow async
//! traits below are what stores and the bill workflow depend on, so they
//! can run against in-process fakes in tests.

mod alerts;
mod auth;
mod bills;
mod categories;
mod gateway;
mod items;

use async_trait::async_trait;
use shared::{
    BillItemAction, BillType, Item, ItemCreate, ItemUpdate, StartBillResponse, TokenResponse, User,
    UserCreate,
};

use crate::error::ClientResult;

pub use gateway::{extract_detail, segment_path, ApiGateway};

/// Session endpoints used by the auth store
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse>;

    async fn register(&self, user: &UserCreate) -> ClientResult<User>;
}

/// Catalog endpoints used by the items store
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_items(&self) -> ClientResult<Vec<Item>>;

    async fn create_item(&self, item: &ItemCreate) -> ClientResult<Item>;

    async fn update_item(&self, id: i64, update: &ItemUpdate) -> ClientResult<Item>;

    async fn delete_item(&self, id: i64) -> ClientResult<()>;
}

/// Bill endpoints driven by the bill workflow
#[async_trait]
pub trait BillApi: Send + Sync {
    async fn start_bill(&self, bill_type: BillType) -> ClientResult<StartBillResponse>;

    /// Adds one line server-side; the server decrements stock
    async fn add_item_to_bill(&self, action: &BillItemAction) -> ClientResult<serde_json::Value>;
}

#[async_trait]
impl AuthApi for ApiGateway {
    async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        ApiGateway::login(self, email, password).await
    }

    async fn register(&self, user: &UserCreate) -> ClientResult<User> {
        ApiGateway::register(self, user).await
    }
}

#[async_trait]
impl CatalogApi for ApiGateway {
    async fn list_items(&self) -> ClientResult<Vec<Item>> {
        ApiGateway::list_items(self).await
    }

    async fn create_item(&self, item: &ItemCreate) -> ClientResult<Item> {
        ApiGateway::create_item(self, item).await
    }

    async fn update_item(&self, id: i64, update: &ItemUpdate) -> ClientResult<Item> {
        ApiGateway::update_item(self, id, update).await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        ApiGateway::delete_item(self, id).await
    }
}

#[async_trait]
impl BillApi for ApiGateway {
    async fn start_bill(&self, bill_type: BillType) -> ClientResult<StartBillResponse> {
        ApiGateway::start_bill(self, bill_type).await
    }

    async fn add_item_to_bill(&self, action: &BillItemAction) -> ClientResult<serde_json::Value> {
        ApiGateway::add_item_to_bill(self, action).await
    }
}
