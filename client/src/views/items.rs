//! Items page

use shared::{Item, StockLevel};

use super::matches_search;

/// Search box plus category dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: String,
    /// `None` means all categories
    pub category_id: Option<i64>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category_id) = self.category_id {
            if item.category.id != category_id {
                return false;
            }
        }
        matches_search(
            &self.search,
            [
                item.name.as_str(),
                item.model_number.as_str(),
                item.description.as_deref().unwrap_or(""),
            ],
        )
    }
}

/// Items passing the filter, in catalog order
pub fn filter_items<'a>(items: &'a [Item], filter: &ItemFilter) -> Vec<&'a Item> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Items in the given stock band
pub fn items_at_level(items: &[Item], level: StockLevel, threshold: i64) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| StockLevel::classify(item.quantity, threshold) == level)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::CategoryRef;

    fn item(id: i64, name: &str, model: &str, category_id: i64, quantity: i64) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity,
            buying_price: Decimal::from(10),
            selling_price: Decimal::from(12),
            description: (id == 2).then(|| "warm white bulb".to_string()),
            model_number: model.to_string(),
            qr_code_path: None,
            category: CategoryRef {
                id: category_id,
                name: format!("Category {}", category_id),
            },
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn catalog() -> Vec<Item> {
        vec![
            item(1, "Ceiling Fan", "FAN-56", 1, 4),
            item(2, "LED Bulb", "LED-9W", 2, 0),
            item(3, "Switch", "SW-1G", 2, 40),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let items = catalog();
        let by_model = ItemFilter {
            search: "led-9".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_items(&items, &by_model).len(), 1);

        let by_description = ItemFilter {
            search: "WARM".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_items(&items, &by_description)[0].id, 2);
    }

    #[test]
    fn test_category_filter_combines_with_search() {
        let items = catalog();
        let filter = ItemFilter {
            search: "s".to_string(),
            category_id: Some(2),
        };
        let ids: Vec<_> = filter_items(&items, &filter).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3]);

        assert_eq!(filter_items(&items, &ItemFilter::default()).len(), 3);
    }

    #[test]
    fn test_items_at_level() {
        let items = catalog();
        assert_eq!(items_at_level(&items, StockLevel::Low, 5)[0].id, 1);
        assert_eq!(items_at_level(&items, StockLevel::OutOfStock, 5)[0].id, 2);
    }
}
