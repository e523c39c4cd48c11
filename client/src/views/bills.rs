//! Bills history page

use shared::{Bill, BillType};

/// Bill id search plus type dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    pub search: String,
    /// `None` means both buy and sell
    pub bill_type: Option<BillType>,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        if self.bill_type.is_some_and(|t| t != bill.bill_type) {
            return false;
        }
        let search = self.search.trim().to_lowercase();
        search.is_empty() || bill.bill_id.to_lowercase().contains(&search)
    }
}

/// Matching bills, newest first
pub fn filter_bills<'a>(bills: &'a [Bill], filter: &BillFilter) -> Vec<&'a Bill> {
    let mut matching: Vec<&Bill> = bills.iter().filter(|b| filter.matches(b)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(id: i64, bill_id: &str, bill_type: BillType, day: u32) -> Bill {
        Bill {
            id,
            bill_id: bill_id.to_string(),
            bill_type,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 5, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_newest_first_with_type_filter() {
        let bills = vec![
            bill(1, "B-001", BillType::Sell, 1),
            bill(2, "B-002", BillType::Buy, 3),
            bill(3, "B-003", BillType::Sell, 2),
        ];

        let all: Vec<_> = filter_bills(&bills, &BillFilter::default())
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(all, vec![2, 3, 1]);

        let sells = BillFilter {
            bill_type: Some(BillType::Sell),
            ..Default::default()
        };
        let ids: Vec<_> = filter_bills(&bills, &sells).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 1]);

        let search = BillFilter {
            search: "b-002".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_bills(&bills, &search).len(), 1);
    }
}
