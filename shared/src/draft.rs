//! Draft bill: the buy/sell bill being assembled on the client
//!
//! A draft only lives in memory. Line items are priced once, when they are
//! added, from the catalog snapshot the caller passes in; later catalog
//! changes never reprice them. Submission drains the line items front to
//! back, moving each acknowledged line into `committed`, so an interrupted
//! save can be resumed without resending what the server already applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BillItemAction, BillType, Item};

/// Read access to the loaded item catalog
pub trait Catalog {
    fn find_by_model(&self, model_number: &str) -> Option<&Item>;
}

impl Catalog for [Item] {
    fn find_by_model(&self, model_number: &str) -> Option<&Item> {
        self.iter().find(|item| item.model_number == model_number)
    }
}

impl Catalog for Vec<Item> {
    fn find_by_model(&self, model_number: &str) -> Option<&Item> {
        self.as_slice().find_by_model(model_number)
    }
}

/// Local workflow state of a draft bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    NotStarted,
    Started,
    Submitting,
    Completed,
    Cancelled,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::NotStarted => "not_started",
            BillStatus::Started => "started",
            BillStatus::Submitting => "submitting",
            BillStatus::Completed => "completed",
            BillStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled drafts accept no further actions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BillStatus::Completed | BillStatus::Cancelled)
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

/// Action attempted in a status that does not allow it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot {action} a bill that is {status}")]
pub struct TransitionError {
    pub action: &'static str,
    pub status: BillStatus,
}

/// Why a line item was rejected. Nothing is sent to the server for these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("Please select an item")]
    NoSelection,

    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,

    #[error("Quantity {0} is too large")]
    QuantityTooLarge(i64),

    #[error("Item {0} is not in the loaded catalog")]
    UnknownItem(String),

    #[error("Insufficient stock for {model_number}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        model_number: String,
        available: i64,
        requested: u32,
    },

    #[error("Amount for {model_number} x {quantity} is too large")]
    AmountTooLarge { model_number: String, quantity: u32 },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// One priced line of a draft bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftLineItem {
    pub model_number: String,
    pub item_name: String,
    pub quantity: u32,
    /// Price copied from the item when the line was added
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl DraftLineItem {
    pub fn to_action(&self, bill_id: &str) -> BillItemAction {
        BillItemAction {
            bill_id: bill_id.to_string(),
            model_number: self.model_number.clone(),
            quantity: self.quantity,
        }
    }
}

/// Client-side bill under construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftBill {
    bill_type: BillType,
    bill_id: Option<String>,
    status: BillStatus,
    line_items: Vec<DraftLineItem>,
    committed: Vec<DraftLineItem>,
}

impl DraftBill {
    pub fn new(bill_type: BillType) -> Self {
        Self {
            bill_type,
            bill_id: None,
            status: BillStatus::NotStarted,
            line_items: Vec::new(),
            committed: Vec::new(),
        }
    }

    pub fn bill_type(&self) -> BillType {
        self.bill_type
    }

    pub fn bill_id(&self) -> Option<&str> {
        self.bill_id.as_deref()
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }

    /// Lines not yet acknowledged by the server, in insertion order
    pub fn line_items(&self) -> &[DraftLineItem] {
        &self.line_items
    }

    /// Lines the server has acknowledged during the current save
    pub fn committed(&self) -> &[DraftLineItem] {
        &self.committed
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Record the server-issued bill id: `not_started` -> `started`
    pub fn begin(&mut self, bill_id: impl Into<String>) -> Result<(), TransitionError> {
        self.require(BillStatus::NotStarted, "start")?;
        self.bill_id = Some(bill_id.into());
        self.status = BillStatus::Started;
        Ok(())
    }

    /// Validate and append a line item.
    ///
    /// Checks run in a fixed order and the first failure wins: selection,
    /// positive quantity, catalog membership, stock for sell bills, then
    /// that the line and bill totals stay representable.
    /// A rejected line leaves the draft untouched.
    pub fn add_line_item<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        model_number: &str,
        quantity: i64,
    ) -> Result<&DraftLineItem, LineItemError> {
        self.require(BillStatus::Started, "add items to")?;

        let model_number = model_number.trim();
        if model_number.is_empty() {
            return Err(LineItemError::NoSelection);
        }
        if quantity <= 0 {
            return Err(LineItemError::NonPositiveQuantity);
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| LineItemError::QuantityTooLarge(quantity))?;

        let item = catalog
            .find_by_model(model_number)
            .ok_or_else(|| LineItemError::UnknownItem(model_number.to_string()))?;

        // Point-in-time check against the snapshot; the server re-checks on save
        if self.bill_type == BillType::Sell && i64::from(quantity) > item.quantity {
            return Err(LineItemError::InsufficientStock {
                model_number: item.model_number.clone(),
                available: item.quantity,
                requested: quantity,
            });
        }

        // Both the line and the bill total must stay representable
        let unit_price = self.bill_type.unit_price(item);
        let line_total = unit_price
            .checked_mul(Decimal::from(quantity))
            .filter(|total| {
                self.checked_sum()
                    .and_then(|sum| sum.checked_add(*total))
                    .is_some()
            })
            .ok_or_else(|| LineItemError::AmountTooLarge {
                model_number: item.model_number.clone(),
                quantity,
            })?;

        self.line_items.push(DraftLineItem {
            model_number: item.model_number.clone(),
            item_name: item.name.clone(),
            quantity,
            unit_price,
            line_total,
        });

        Ok(&self.line_items[self.line_items.len() - 1])
    }

    /// Discard every line item; per-line removal is not offered
    pub fn clear_line_items(&mut self) -> Result<(), TransitionError> {
        self.require(BillStatus::Started, "clear")?;
        self.line_items.clear();
        Ok(())
    }

    /// Sum of the pending line totals
    pub fn grand_total(&self) -> Decimal {
        sum_lines(&self.line_items)
    }

    /// Sum of the line totals already acknowledged by the server
    pub fn committed_total(&self) -> Decimal {
        sum_lines(&self.committed)
    }

    fn checked_sum(&self) -> Option<Decimal> {
        self.committed
            .iter()
            .chain(&self.line_items)
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total))
    }

    /// `started` -> `submitting`. Re-entering from `submitting` resumes an
    /// interrupted save.
    pub fn begin_submission(&mut self) -> Result<(), TransitionError> {
        match self.status {
            BillStatus::Started | BillStatus::Submitting => {
                self.status = BillStatus::Submitting;
                Ok(())
            }
            status => Err(TransitionError {
                action: "save",
                status,
            }),
        }
    }

    /// Request body for the next line to send, if any remain
    pub fn next_pending(&self) -> Option<BillItemAction> {
        if self.status != BillStatus::Submitting {
            return None;
        }
        let bill_id = self.bill_id.as_deref()?;
        self.line_items.first().map(|line| line.to_action(bill_id))
    }

    /// Mark the front line as acknowledged by the server
    pub fn commit_next(&mut self) -> Option<&DraftLineItem> {
        if self.status != BillStatus::Submitting || self.line_items.is_empty() {
            return None;
        }
        let line = self.line_items.remove(0);
        self.committed.push(line);
        self.committed.last()
    }

    /// `submitting` -> `completed` once every line was acknowledged.
    /// Returns the committed lines and clears the draft.
    pub fn complete(&mut self) -> Result<Vec<DraftLineItem>, TransitionError> {
        if self.status != BillStatus::Submitting || !self.line_items.is_empty() {
            return Err(TransitionError {
                action: "complete",
                status: self.status,
            });
        }
        self.status = BillStatus::Completed;
        Ok(std::mem::take(&mut self.committed))
    }

    /// Discard the draft without telling the server
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        match self.status {
            BillStatus::Started | BillStatus::Submitting => {
                self.status = BillStatus::Cancelled;
                self.line_items.clear();
                self.committed.clear();
                Ok(())
            }
            status => Err(TransitionError {
                action: "cancel",
                status,
            }),
        }
    }

    fn require(&self, expected: BillStatus, action: &'static str) -> Result<(), TransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TransitionError {
                action,
                status: self.status,
            })
        }
    }
}

// Every prefix was checked on insert, so saturation never kicks in for a
// draft built through `add_line_item`
fn sum_lines(lines: &[DraftLineItem]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(model: &str, quantity: i64, buying: &str, selling: &str) -> Item {
        Item {
            id: 1,
            name: format!("Item {}", model),
            quantity,
            buying_price: dec(buying),
            selling_price: dec(selling),
            description: None,
            model_number: model.to_string(),
            qr_code_path: None,
            category: CategoryRef {
                id: 1,
                name: "General".to_string(),
            },
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn started(bill_type: BillType) -> DraftBill {
        let mut draft = DraftBill::new(bill_type);
        draft.begin("B-100").unwrap();
        draft
    }

    #[test]
    fn test_new_bill_is_empty() {
        let draft = started(BillType::Sell);
        assert_eq!(draft.status(), BillStatus::Started);
        assert!(draft.line_items().is_empty());
        assert_eq!(draft.grand_total(), Decimal::ZERO);
    }

    #[test]
    fn test_cannot_add_before_start() {
        let catalog = vec![item("A", 10, "80", "100")];
        let mut draft = DraftBill::new(BillType::Sell);

        let err = draft.add_line_item(&catalog, "A", 1).unwrap_err();
        assert!(matches!(err, LineItemError::Transition(_)));
        assert_eq!(
            err.to_string(),
            "Cannot add items to a bill that is not started"
        );
        assert!(draft.line_items().is_empty());
    }

    #[test]
    fn test_same_item_on_two_lines() {
        let catalog = vec![item("A", 10, "80", "100")];
        let mut draft = started(BillType::Sell);

        let first = draft.add_line_item(&catalog, "A", 3).unwrap();
        assert_eq!(first.line_total, dec("300"));
        assert_eq!(draft.grand_total(), dec("300"));

        draft.add_line_item(&catalog, "A", 4).unwrap();
        assert_eq!(draft.line_items().len(), 2);
        assert_eq!(draft.grand_total(), dec("700"));
    }

    #[test]
    fn test_insufficient_stock_is_rejected() {
        let catalog = vec![item("B", 2, "10", "15")];
        let mut draft = started(BillType::Sell);

        let err = draft.add_line_item(&catalog, "B", 5).unwrap_err();
        assert!(err.to_string().contains("Available: 2, Requested: 5"));
        assert!(draft.line_items().is_empty());
    }

    #[test]
    fn test_buy_bill_ignores_stock() {
        let catalog = vec![item("B", 2, "10", "15")];
        let mut draft = started(BillType::Buy);

        let line = draft.add_line_item(&catalog, "B", 50).unwrap();
        assert_eq!(line.unit_price, dec("10"));
        assert_eq!(line.line_total, dec("500"));
    }

    #[test]
    fn test_oversized_amount_is_rejected() {
        let catalog = vec![item("X", 0, "100000000000000000000", "1")];
        let mut draft = started(BillType::Buy);

        let err = draft.add_line_item(&catalog, "X", 1_000_000_000).unwrap_err();
        assert_eq!(
            err,
            LineItemError::AmountTooLarge {
                model_number: "X".to_string(),
                quantity: 1_000_000_000
            }
        );
        assert!(draft.line_items().is_empty());
        assert_eq!(draft.grand_total(), Decimal::ZERO);
    }

    #[test]
    fn test_total_overflow_keeps_existing_lines() {
        let catalog = vec![item("X", 0, "30000000000000000000000000000", "1")];
        let mut draft = started(BillType::Buy);

        draft.add_line_item(&catalog, "X", 2).unwrap();
        assert!(matches!(
            draft.add_line_item(&catalog, "X", 1),
            Err(LineItemError::AmountTooLarge { .. })
        ));
        assert_eq!(draft.line_items().len(), 1);
        assert_eq!(draft.grand_total(), dec("60000000000000000000000000000"));
    }

    #[test]
    fn test_validation_order() {
        let catalog = vec![item("A", 1, "1", "2")];
        let mut draft = started(BillType::Sell);

        assert_eq!(
            draft.add_line_item(&catalog, "  ", 0).unwrap_err(),
            LineItemError::NoSelection
        );
        assert_eq!(
            draft.add_line_item(&catalog, "Z", 0).unwrap_err(),
            LineItemError::NonPositiveQuantity
        );
        assert_eq!(
            draft.add_line_item(&catalog, "Z", 9).unwrap_err(),
            LineItemError::UnknownItem("Z".to_string())
        );
        assert!(matches!(
            draft.add_line_item(&catalog, "A", i64::MAX).unwrap_err(),
            LineItemError::QuantityTooLarge(_)
        ));
    }

    #[test]
    fn test_price_fixed_at_add_time() {
        let mut catalog = vec![item("A", 10, "80", "100")];
        let mut draft = started(BillType::Sell);
        draft.add_line_item(&catalog, "A", 2).unwrap();

        catalog[0].selling_price = dec("999");
        catalog[0].quantity = 0;

        assert_eq!(draft.line_items()[0].unit_price, dec("100"));
        assert_eq!(draft.grand_total(), dec("200"));
    }

    #[test]
    fn test_submission_drains_in_order() {
        let catalog = vec![item("A", 10, "1", "2"), item("B", 10, "3", "4")];
        let mut draft = started(BillType::Sell);
        draft.add_line_item(&catalog, "A", 1).unwrap();
        draft.add_line_item(&catalog, "B", 2).unwrap();

        assert!(draft.next_pending().is_none());
        draft.begin_submission().unwrap();

        let first = draft.next_pending().unwrap();
        assert_eq!(first.model_number, "A");
        assert_eq!(first.bill_id, "B-100");
        draft.commit_next();

        assert_eq!(draft.next_pending().unwrap().model_number, "B");
        assert_eq!(draft.committed_total(), dec("2"));
        assert!(draft.complete().is_err());

        draft.commit_next();
        assert!(draft.next_pending().is_none());
        let committed = draft.complete().unwrap();
        assert_eq!(committed.len(), 2);
        assert_eq!(draft.status(), BillStatus::Completed);
        assert!(draft.committed().is_empty());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let catalog = vec![item("A", 10, "1", "2")];
        let mut draft = started(BillType::Sell);
        draft.add_line_item(&catalog, "A", 1).unwrap();

        draft.cancel().unwrap();
        assert_eq!(draft.status(), BillStatus::Cancelled);
        assert!(draft.is_empty());
        assert!(draft.cancel().is_err());
        assert!(draft.begin("B-2").is_err());
    }

    #[test]
    fn test_clear_only_while_started() {
        let catalog = vec![item("A", 10, "1", "2")];
        let mut draft = started(BillType::Buy);
        draft.add_line_item(&catalog, "A", 1).unwrap();
        draft.clear_line_items().unwrap();
        assert_eq!(draft.grand_total(), Decimal::ZERO);

        draft.add_line_item(&catalog, "A", 1).unwrap();
        draft.begin_submission().unwrap();
        assert!(draft.clear_line_items().is_err());
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Grand total is the sum of unit price x quantity captured at add time
        #[test]
        fn prop_grand_total_matches_lines(
            lines in prop::collection::vec((price_strategy(), price_strategy(), 1i64..50), 0..20),
            sell in any::<bool>(),
        ) {
            let bill_type = if sell { BillType::Sell } else { BillType::Buy };
            let mut catalog: Vec<Item> = Vec::new();
            let mut draft = started(bill_type);
            let mut expected = Decimal::ZERO;

            for (i, (buying, selling, qty)) in lines.iter().enumerate() {
                let model = format!("M{}", i);
                let mut it = item(&model, 1_000, "0", "0");
                it.buying_price = *buying;
                it.selling_price = *selling;
                catalog.push(it);

                let line = draft.add_line_item(&catalog, &model, *qty).unwrap();
                let price = if sell { *selling } else { *buying };
                prop_assert_eq!(line.unit_price, price);
                expected += price * Decimal::from(*qty);
            }

            for it in catalog.iter_mut() {
                it.buying_price += Decimal::ONE;
                it.selling_price += Decimal::ONE;
            }

            prop_assert_eq!(draft.grand_total(), expected);
        }

        /// Over-stock sell lines never mutate the draft
        #[test]
        fn prop_oversell_rejected(stock in 0i64..100, extra in 1i64..100) {
            let catalog = vec![item("A", stock, "1", "2")];
            let mut draft = started(BillType::Sell);
            let before = draft.clone();

            let result = draft.add_line_item(&catalog, "A", stock + extra);
            let is_rejected = matches!(
                result,
                Err(LineItemError::InsufficientStock { .. })
            );
            prop_assert!(is_rejected);
            prop_assert_eq!(draft, before);
        }
    }
}
