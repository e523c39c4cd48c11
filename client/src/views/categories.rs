//! Categories page

use shared::Category;

use super::matches_search;

/// Categories whose name or description contains `search`
pub fn filter_categories<'a>(categories: &'a [Category], search: &str) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| {
            matches_search(
                search,
                [c.name.as_str(), c.description.as_deref().unwrap_or("")],
            )
        })
        .collect()
}
