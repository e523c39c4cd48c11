//! Catalog store
//!
//! Holds the latest catalog snapshot. Local edits made before the server has
//! confirmed them are tagged [`SyncState::Pending`] so a page can tell them
//! apart from data that came back from the API.

use shared::{Catalog, Item, ItemCreate, ItemUpdate};
use validator::Validate;

use crate::api::CatalogApi;
use crate::error::{ClientError, ClientResult};

const SAVE_FAILED: &str = "Failed to save item";
const DELETE_FAILED: &str = "Failed to delete item";

/// Whether a cached entry reflects server state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Edited locally, not yet confirmed by the server
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedItem {
    pub item: Item,
    pub sync: SyncState,
}

/// Cached item catalog
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<CachedItem>,
    is_loading: bool,
    error: Option<String>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().map(|c| &c.item)
    }

    pub fn entries(&self) -> &[CachedItem] {
        &self.items
    }

    /// Items with local edits the server has not confirmed
    pub fn pending(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|c| c.sync == SyncState::Pending)
            .map(|c| &c.item)
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|c| c.item.id == id).map(|c| &c.item)
    }

    /// Owned copy of the catalog, e.g. for handing to a filter view
    pub fn snapshot(&self) -> Vec<Item> {
        self.items().cloned().collect()
    }

    /// Replace the cache with a fresh server snapshot
    pub async fn fetch(&mut self, api: &dyn CatalogApi) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;

        let result = api.list_items().await;
        self.is_loading = false;

        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Catalog refreshed");
                self.set_items(items);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message("Failed to fetch items"));
                Err(e)
            }
        }
    }

    /// Validate the form, create the item server-side and cache the copy the
    /// server returned
    pub async fn create(&mut self, api: &dyn CatalogApi, form: ItemCreate) -> ClientResult<Item> {
        self.error = None;
        let form = form.normalized();
        if let Err(errors) = form.validate() {
            return Err(self.fail(errors.into(), SAVE_FAILED));
        }

        match api.create_item(&form).await {
            Ok(item) => {
                tracing::info!(id = item.id, model_number = %item.model_number, "Item created");
                self.add(item.clone(), SyncState::Confirmed);
                Ok(item)
            }
            Err(e) => Err(self.fail(e, SAVE_FAILED)),
        }
    }

    /// Save an edited item.
    ///
    /// The cached entry shows the edit as [`SyncState::Pending`] until the
    /// server answers; it is then replaced by the server's copy, or restored
    /// if the edit was rejected.
    pub async fn edit(&mut self, api: &dyn CatalogApi, id: i64, form: ItemCreate) -> ClientResult<Item> {
        self.error = None;
        let form = form.normalized();
        if let Err(errors) = form.validate() {
            return Err(self.fail(errors.into(), SAVE_FAILED));
        }

        let previous = self.get(id).cloned();
        if let Some(current) = &previous {
            self.update(id, apply_form(current, &form), SyncState::Pending);
        }

        match api.update_item(id, &ItemUpdate::from(form)).await {
            Ok(item) => {
                tracing::info!(id, "Item updated");
                if !self.update(id, item.clone(), SyncState::Confirmed) {
                    self.add(item.clone(), SyncState::Confirmed);
                }
                Ok(item)
            }
            Err(e) => {
                if let Some(previous) = previous {
                    self.update(id, previous, SyncState::Confirmed);
                }
                Err(self.fail(e, SAVE_FAILED))
            }
        }
    }

    /// Delete server-side, then drop the cached entry. A rejected delete
    /// leaves the entry in place.
    pub async fn delete(&mut self, api: &dyn CatalogApi, id: i64) -> ClientResult<()> {
        self.error = None;
        if let Some(current) = self.get(id).cloned() {
            self.update(id, current, SyncState::Pending);
        }

        match api.delete_item(id).await {
            Ok(()) => {
                tracing::info!(id, "Item deleted");
                self.remove(id);
                Ok(())
            }
            Err(e) => {
                self.confirm(id);
                Err(self.fail(e, DELETE_FAILED))
            }
        }
    }

    fn fail(&mut self, error: ClientError, fallback: &str) -> ClientError {
        self.error = Some(error.user_message(fallback));
        error
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items
            .into_iter()
            .map(|item| CachedItem {
                item,
                sync: SyncState::Confirmed,
            })
            .collect();
    }

    /// Append an item, e.g. the body returned by a successful create
    pub fn add(&mut self, item: Item, sync: SyncState) {
        self.items.push(CachedItem { item, sync });
    }

    /// Replace the entry with the given id. Returns false if it is not cached.
    pub fn update(&mut self, id: i64, item: Item, sync: SyncState) -> bool {
        match self.items.iter_mut().find(|c| c.item.id == id) {
            Some(entry) => {
                *entry = CachedItem { item, sync };
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Item> {
        let index = self.items.iter().position(|c| c.item.id == id)?;
        Some(self.items.remove(index).item)
    }

    /// Mark a pending entry as confirmed by the server
    pub fn confirm(&mut self, id: i64) -> bool {
        match self.items.iter_mut().find(|c| c.item.id == id) {
            Some(entry) => {
                entry.sync = SyncState::Confirmed;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.error = None;
        self.is_loading = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Local copy of `item` with the form's fields applied
fn apply_form(item: &Item, form: &ItemCreate) -> Item {
    let mut edited = item.clone();
    edited.name = form.name.clone();
    edited.quantity = form.quantity;
    edited.buying_price = form.buying_price;
    edited.selling_price = form.selling_price;
    edited.description = form.description.clone();
    edited.category.id = form.category_id;
    edited
}

impl Catalog for ItemStore {
    fn find_by_model(&self, model_number: &str) -> Option<&Item> {
        self.items().find(|item| item.model_number == model_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::CategoryRef;

    fn item(id: i64, model: &str, quantity: i64) -> Item {
        Item {
            id,
            name: format!("Item {}", id),
            quantity,
            buying_price: Decimal::new(1000, 2),
            selling_price: Decimal::new(1500, 2),
            description: None,
            model_number: model.to_string(),
            qr_code_path: None,
            category: CategoryRef {
                id: 1,
                name: "Switches".to_string(),
            },
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Api {
            status: 503,
            detail: None,
        }
    }

    fn form(name: &str) -> ItemCreate {
        ItemCreate {
            name: name.to_string(),
            quantity: 8,
            buying_price: Decimal::from(20),
            selling_price: Decimal::from(30),
            description: None,
            category_id: 1,
        }
    }

    struct FixedCatalog(ClientResult<Vec<Item>>);

    #[async_trait]
    impl CatalogApi for FixedCatalog {
        async fn list_items(&self) -> ClientResult<Vec<Item>> {
            match &self.0 {
                Ok(items) => Ok(items.clone()),
                Err(_) => Err(unavailable()),
            }
        }

        async fn create_item(&self, form: &ItemCreate) -> ClientResult<Item> {
            if self.0.is_err() {
                return Err(unavailable());
            }
            let mut created = item(50, "NEW-1", form.quantity);
            created.name = form.name.clone();
            Ok(created)
        }

        async fn update_item(&self, id: i64, update: &ItemUpdate) -> ClientResult<Item> {
            if self.0.is_err() {
                return Err(ClientError::Api {
                    status: 400,
                    detail: Some("Category not found".to_string()),
                });
            }
            let mut updated = item(id, "SW-1", update.quantity.unwrap_or_default());
            updated.name = update.name.clone().unwrap_or_default();
            Ok(updated)
        }

        async fn delete_item(&self, _id: i64) -> ClientResult<()> {
            match &self.0 {
                Ok(_) => Ok(()),
                Err(_) => Err(unavailable()),
            }
        }
    }

    #[test]
    fn test_fetch_replaces_cache() {
        let mut store = ItemStore::new();
        store.add(item(99, "OLD", 1), SyncState::Pending);

        let api = FixedCatalog(Ok(vec![item(1, "SW-1", 3), item(2, "SW-2", 0)]));
        tokio_test::block_on(store.fetch(&api)).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(99).is_none());
        assert_eq!(store.pending().count(), 0);
        assert_eq!(store.find_by_model("SW-2").map(|i| i.id), Some(2));
    }

    #[test]
    fn test_fetch_failure_keeps_cache() {
        let mut store = ItemStore::new();
        store.set_items(vec![item(1, "SW-1", 3)]);

        let api = FixedCatalog(Err(ClientError::Validation(String::new())));
        assert!(tokio_test::block_on(store.fetch(&api)).is_err());

        assert_eq!(store.error(), Some("Failed to fetch items"));
        assert_eq!(store.len(), 1);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_pending_then_confirmed() {
        let mut store = ItemStore::new();
        store.set_items(vec![item(1, "SW-1", 3)]);

        let mut edited = item(1, "SW-1", 3);
        edited.name = "Renamed".to_string();
        assert!(store.update(1, edited, SyncState::Pending));
        assert_eq!(store.pending().count(), 1);

        assert!(store.confirm(1));
        assert_eq!(store.pending().count(), 0);
        assert_eq!(store.get(1).map(|i| i.name.as_str()), Some("Renamed"));

        assert!(!store.update(42, item(42, "X", 0), SyncState::Confirmed));
        assert_eq!(store.remove(1).map(|i| i.id), Some(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_caches_server_copy() {
        let mut store = ItemStore::new();
        let api = FixedCatalog(Ok(vec![]));

        let created = tokio_test::block_on(store.create(&api, form("  Dimmer  "))).unwrap();
        assert_eq!(created.name, "Dimmer");
        assert_eq!(store.get(50).map(|i| i.model_number.as_str()), Some("NEW-1"));
        assert_eq!(store.pending().count(), 0);
    }

    #[test]
    fn test_invalid_form_is_not_sent() {
        let mut store = ItemStore::new();
        let api = FixedCatalog(Err(unavailable()));

        let err = tokio_test::block_on(store.create(&api, form("   "))).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.error(), Some("Item name is required"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_edit_confirms_or_restores() {
        let mut store = ItemStore::new();
        store.set_items(vec![item(1, "SW-1", 3)]);

        let ok = FixedCatalog(Ok(vec![]));
        tokio_test::block_on(store.edit(&ok, 1, form("Two-way switch"))).unwrap();
        assert_eq!(store.get(1).map(|i| i.name.as_str()), Some("Two-way switch"));
        assert_eq!(store.get(1).map(|i| i.quantity), Some(8));
        assert_eq!(store.pending().count(), 0);

        let rejecting = FixedCatalog(Err(unavailable()));
        let err = tokio_test::block_on(store.edit(&rejecting, 1, form("Renamed"))).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(store.error(), Some("Category not found"));
        assert_eq!(store.get(1).map(|i| i.name.as_str()), Some("Two-way switch"));
        assert_eq!(store.entries()[0].sync, SyncState::Confirmed);
    }

    #[test]
    fn test_delete_keeps_entry_on_failure() {
        let mut store = ItemStore::new();
        store.set_items(vec![item(1, "SW-1", 3), item(2, "SW-2", 1)]);

        let rejecting = FixedCatalog(Err(unavailable()));
        assert!(tokio_test::block_on(store.delete(&rejecting, 2)).is_err());
        assert_eq!(store.error(), Some("Failed to delete item"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.pending().count(), 0);

        let ok = FixedCatalog(Ok(vec![]));
        tokio_test::block_on(store.delete(&ok, 2)).unwrap();
        assert!(store.get(2).is_none());
        assert!(store.error().is_none());
    }
}
