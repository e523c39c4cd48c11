//! List and filter views
//!
//! Pure functions over fetched data: local search, filters, sort order and
//! the summary figures each page shows. Network access stays in the callers.

pub mod alerts;
pub mod bills;
pub mod categories;
pub mod dashboard;
pub mod items;
pub mod settings;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use alerts::{filter_alerts, AlertStatusFilter};
pub use bills::{filter_bills, BillFilter};
pub use categories::filter_categories;
pub use dashboard::{low_stock_preview, DashboardSummary, LOW_STOCK_PREVIEW};
pub use items::{filter_items, items_at_level, ItemFilter};
pub use settings::NotificationSettingsForm;

/// Tracks page lifetimes so late responses can be dropped.
///
/// Every `mount` invalidates the tokens handed out before it, as does
/// `unmount`. A fetch captures a token when it starts and checks it when the
/// response lands.
#[derive(Debug, Clone, Default)]
pub struct PageGuard {
    generation: Arc<AtomicU64>,
}

/// Proof that a page was mounted when a request started
#[derive(Debug, Clone)]
pub struct MountToken {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl PageGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self) -> MountToken {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        MountToken {
            generation: Arc::clone(&self.generation),
            issued,
        }
    }

    pub fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl MountToken {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }

    /// Hand back `value` only if the page is still mounted
    pub fn accept<T>(&self, value: T) -> Option<T> {
        if self.is_current() {
            Some(value)
        } else {
            tracing::debug!("Discarding response for an unmounted page");
            None
        }
    }
}

/// "Showing N of M <noun>"
pub fn showing_summary(shown: usize, total: usize, noun: &str) -> String {
    format!("Showing {} of {} {}", shown, total, noun)
}

/// Case-insensitive substring match over any of the given fields.
/// An empty query matches everything.
pub(crate) fn matches_search<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_response_is_dropped() {
        let guard = PageGuard::new();
        let token = guard.mount();
        assert!(token.is_current());
        assert_eq!(token.accept(3), Some(3));

        guard.unmount();
        assert!(!token.is_current());
        assert_eq!(token.accept(3), None);
    }

    #[test]
    fn test_remount_invalidates_old_token() {
        let guard = PageGuard::new();
        let first = guard.mount();
        let second = guard.clone().mount();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_search_helpers() {
        assert!(matches_search("", ["anything"]));
        assert!(matches_search("  led ", ["Bulb", "LED-9W"]));
        assert!(!matches_search("fan", ["Bulb", "LED-9W"]));
        assert_eq!(showing_summary(2, 10, "items"), "Showing 2 of 10 items");
    }
}
