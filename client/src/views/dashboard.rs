//! Dashboard figures

use rust_decimal::Decimal;
use shared::{is_low_stock, AlertStats, Item, StockLevel};

use super::items::items_at_level;

/// How many low stock items the dashboard lists by name
pub const LOW_STOCK_PREVIEW: usize = 5;

/// Headline numbers on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_items: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    /// Stock valued at buying price
    pub total_value: Decimal,
    pub active_alerts: i64,
}

impl DashboardSummary {
    /// Compute from a catalog snapshot. Alert counts come from
    /// `GET /alerts/stats`; without them the alert figure is zero.
    pub fn compute(items: &[Item], stats: Option<&AlertStats>, low_stock_threshold: i64) -> Self {
        Self {
            total_items: items.len(),
            low_stock_items: items
                .iter()
                .filter(|i| is_low_stock(i.quantity, low_stock_threshold))
                .count(),
            out_of_stock_items: items.iter().filter(|i| i.quantity == 0).count(),
            total_value: items
                .iter()
                .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.stock_value())),
            active_alerts: stats.map(|s| s.active_alerts).unwrap_or_default(),
        }
    }
}

/// The first low stock items in catalog order, plus how many were left out
pub fn low_stock_preview(items: &[Item], low_stock_threshold: i64) -> (Vec<&Item>, usize) {
    let mut low = items_at_level(items, StockLevel::Low, low_stock_threshold);
    let hidden = low.len().saturating_sub(LOW_STOCK_PREVIEW);
    low.truncate(LOW_STOCK_PREVIEW);
    (low, hidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CategoryRef, DEFAULT_LOW_STOCK_THRESHOLD};

    fn item(quantity: i64, buying_price: Decimal) -> Item {
        Item {
            id: quantity,
            name: "Cable".to_string(),
            quantity,
            buying_price,
            selling_price: buying_price,
            description: None,
            model_number: format!("CBL-{}", quantity),
            qr_code_path: None,
            category: CategoryRef {
                id: 1,
                name: "Cables".to_string(),
            },
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_compute_summary() {
        let items = vec![
            item(0, Decimal::from(100)),
            item(3, Decimal::new(250, 2)),
            item(4, Decimal::from(10)),
            item(5, Decimal::from(2)),
        ];
        let stats = AlertStats {
            active_alerts: 2,
            ..Default::default()
        };

        let summary = DashboardSummary::compute(&items, Some(&stats), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.low_stock_items, 2);
        assert_eq!(summary.out_of_stock_items, 1);
        // 0 + 7.50 + 40 + 10
        assert_eq!(summary.total_value, Decimal::new(5750, 2));
        assert_eq!(summary.active_alerts, 2);
    }

    #[test]
    fn test_total_value_saturates() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        let items = vec![item(1_000_000_000, huge), item(7, Decimal::ONE)];

        let summary = DashboardSummary::compute(&items, None, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(summary.total_value, Decimal::MAX);
        assert_eq!(summary.total_items, 2);
    }

    #[test]
    fn test_low_stock_preview() {
        let items: Vec<Item> = (0..9).map(|q| item(q, Decimal::ONE)).collect();

        let (shown, hidden) = low_stock_preview(&items, 8);
        let quantities: Vec<_> = shown.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![1, 2, 3, 4, 5]);
        assert_eq!(hidden, 2);

        let (shown, hidden) = low_stock_preview(&items, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(shown.len(), 4);
        assert_eq!(hidden, 0);
    }

    #[test]
    fn test_empty_catalog() {
        let summary = DashboardSummary::compute(&[], None, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(summary, DashboardSummary::default());
    }
}
