//! Application context
//!
//! One explicit container for everything a page or command needs, built once
//! from configuration and passed down. Nothing here is global.

use std::future::Future;
use std::sync::Arc;

use shared::{BillType, TokenStore};

use crate::api::ApiGateway;
use crate::config::Config;
use crate::error::ClientResult;
use crate::session::FileTokenStore;
use crate::stores::{AuthStore, ItemStore};
use crate::views::PageGuard;
use crate::workflow::BillWorkflow;

/// Shared state for the admin client
pub struct AppContext {
    pub config: Arc<Config>,
    pub gateway: Arc<ApiGateway>,
    pub tokens: Arc<dyn TokenStore>,
    pub auth: AuthStore,
    pub items: ItemStore,
    pub pages: PageGuard,
}

impl AppContext {
    /// Build the context with the on-disk token store from `session.token_path`
    pub fn from_config(config: Config) -> ClientResult<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.session.token_path));
        Self::with_tokens(config, tokens)
    }

    /// Build the context around any token store
    pub fn with_tokens(config: Config, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let gateway = Arc::new(ApiGateway::new(&config.api, Arc::clone(&tokens))?);
        let mut auth = AuthStore::new(Arc::clone(&tokens));
        auth.initialize();

        tracing::debug!(
            base_url = gateway.base_url(),
            authenticated = auth.is_authenticated(),
            "Application context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            gateway,
            tokens,
            auth,
            items: ItemStore::new(),
            pages: PageGuard::new(),
        })
    }

    /// Low stock threshold used by views
    pub fn low_stock_threshold(&self) -> i64 {
        self.config.alerts.low_stock_threshold
    }

    /// A fresh bill workflow bound to this context's gateway
    pub fn new_bill_workflow(&self, bill_type: BillType) -> BillWorkflow {
        BillWorkflow::new(self.gateway.clone(), bill_type)
    }

    /// Run one page load against a fresh mount token.
    ///
    /// Resolves to `None` when the page was unmounted or mounted again before
    /// the response landed; the caller then renders nothing.
    pub async fn load_page<T, F>(&self, load: F) -> ClientResult<Option<T>>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let token = self.pages.mount();
        let value = load.await?;
        Ok(token.accept(value))
    }

    /// Refresh the catalog cache
    pub async fn refresh_items(&mut self) -> ClientResult<()> {
        self.items.fetch(self.gateway.as_ref()).await
    }

    /// Sign out and drop every cached store
    pub fn teardown(&mut self) -> ClientResult<()> {
        self.pages.unmount();
        self.items.clear();
        self.auth.logout()
    }
}
