//! Client-side caches of session and catalog state
//!
//! Stores are plain values owned by [`crate::context::AppContext`] and handed
//! to pages explicitly. They talk to the server only through the narrow API
//! traits passed into each call.

pub mod auth;
pub mod items;

pub use auth::AuthStore;
pub use items::{CachedItem, ItemStore, SyncState};
