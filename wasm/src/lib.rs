//! WebAssembly module for the Stockbill admin client
//!
//! Provides client-side computation for:
//! - Line and grand totals of a draft bill
//! - Stock checks before a line is accepted
//! - Price and quantity display formatting
//! - Session token storage in `localStorage`

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{
    BillType, DraftBill, Item, StorageError, TokenStore, DEFAULT_LOW_STOCK_THRESHOLD, TOKEN_KEY,
};
use wasm_bindgen::prelude::*;

fn to_js(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn parse_catalog(catalog_json: &str) -> Result<Vec<Item>, String> {
    serde_json::from_str(catalog_json).map_err(|e| format!("Invalid catalog JSON: {}", e))
}

/// Line total for a unit price and quantity, saturating at the decimal range
#[wasm_bindgen(js_name = calculateLineTotal)]
pub fn calculate_line_total(unit_price: f64, quantity: u32) -> f64 {
    float(decimal(unit_price).saturating_mul(Decimal::from(quantity)))
}

/// Format an amount as US dollars, e.g. `$1,234.50`
#[wasm_bindgen(js_name = formatPrice)]
pub fn format_price(amount: f64) -> String {
    shared::format_price(decimal(amount))
}

/// "Out of Stock", "No Stock" or the number
#[wasm_bindgen(js_name = formatQuantity)]
pub fn format_quantity(quantity: i32) -> String {
    shared::format_quantity(i64::from(quantity))
}

/// `0 < quantity < threshold`; a threshold of 0 means the default
#[wasm_bindgen(js_name = isLowStock)]
pub fn is_low_stock(quantity: i32, threshold: i32) -> bool {
    let threshold = if threshold > 0 {
        i64::from(threshold)
    } else {
        DEFAULT_LOW_STOCK_THRESHOLD
    };
    shared::is_low_stock(i64::from(quantity), threshold)
}

/// `(selling - buying) * quantity`
#[wasm_bindgen(js_name = calculateProfit)]
pub fn calculate_profit(buying_price: f64, selling_price: f64, quantity: i32) -> f64 {
    float(shared::calculate_profit(
        decimal(buying_price),
        decimal(selling_price),
        i64::from(quantity),
    ))
}

/// A draft bill kept in the browser.
///
/// JavaScript performs the HTTP calls and reports each acknowledgement back
/// through `commitNext`, so the draft stays the single source of truth for
/// which lines are still unsent.
#[wasm_bindgen]
pub struct DraftBillHandle {
    draft: DraftBill,
}

#[wasm_bindgen]
impl DraftBillHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(bill_type: &str) -> Result<DraftBillHandle, JsValue> {
        Self::create(bill_type).map_err(to_js)
    }

    pub fn status(&self) -> String {
        self.draft.status().as_str().to_string()
    }

    /// Completed or cancelled; the handle accepts no further actions
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.draft.status().is_terminal()
    }

    #[wasm_bindgen(js_name = billId)]
    pub fn bill_id(&self) -> Option<String> {
        self.draft.bill_id().map(str::to_string)
    }

    /// Record the id returned by `POST /bill/start`
    pub fn begin(&mut self, bill_id: &str) -> Result<(), JsValue> {
        self.draft.begin(bill_id).map_err(to_js)
    }

    /// Validate against the catalog snapshot and append a line
    #[wasm_bindgen(js_name = addLineItem)]
    pub fn add_line_item(&mut self, catalog_json: &str, model_number: &str, quantity: i32) -> Result<f64, JsValue> {
        self.add_line(catalog_json, model_number, i64::from(quantity))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearLineItems)]
    pub fn clear_line_items(&mut self) -> Result<(), JsValue> {
        self.draft.clear_line_items().map_err(to_js)
    }

    #[wasm_bindgen(js_name = grandTotal)]
    pub fn grand_total(&self) -> f64 {
        float(self.draft.grand_total())
    }

    /// Pending lines as a JSON array
    #[wasm_bindgen(js_name = lineItemsJson)]
    pub fn line_items_json(&self) -> String {
        serde_json::to_string(self.draft.line_items()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = beginSubmission)]
    pub fn begin_submission(&mut self) -> Result<(), JsValue> {
        self.draft.begin_submission().map_err(to_js)
    }

    /// Body for the next `POST /bill/item`, or `undefined` when done
    #[wasm_bindgen(js_name = nextPendingJson)]
    pub fn next_pending_json(&self) -> Option<String> {
        self.draft
            .next_pending()
            .and_then(|action| serde_json::to_string(&action).ok())
    }

    /// Call after the server acknowledged the line from `nextPendingJson`
    #[wasm_bindgen(js_name = commitNext)]
    pub fn commit_next(&mut self) -> bool {
        self.draft.commit_next().is_some()
    }

    pub fn complete(&mut self) -> Result<String, JsValue> {
        let lines = self.draft.complete().map_err(to_js)?;
        serde_json::to_string(&lines).map_err(to_js)
    }

    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.draft.cancel().map_err(to_js)
    }
}

impl DraftBillHandle {
    fn create(bill_type: &str) -> Result<Self, String> {
        let bill_type: BillType = bill_type.parse()?;
        Ok(Self {
            draft: DraftBill::new(bill_type),
        })
    }

    fn add_line(&mut self, catalog_json: &str, model_number: &str, quantity: i64) -> Result<f64, String> {
        let catalog = parse_catalog(catalog_json)?;
        let line = self
            .draft
            .add_line_item(&catalog, model_number, quantity)
            .map_err(|e| e.to_string())?;
        Ok(float(line.line_total))
    }
}

/// Session token in the browser's `localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageTokenStore;

impl LocalStorageTokenStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError("no window".to_string()))?
            .local_storage()
            .map_err(|_| StorageError("localStorage is not accessible".to_string()))?
            .ok_or_else(|| StorageError("localStorage is unavailable".to_string()))
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        Self::storage()
            .ok()?
            .get_item(TOKEN_KEY)
            .ok()
            .flatten()
            .filter(|token| !token.is_empty())
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(TOKEN_KEY, token)
            .map_err(|_| StorageError("could not write to localStorage".to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(TOKEN_KEY)
            .map_err(|_| StorageError("could not write to localStorage".to_string()))
    }
}

/// Stored session token, if any
#[wasm_bindgen(js_name = getAuthToken)]
pub fn get_auth_token() -> Option<String> {
    LocalStorageTokenStore.load()
}
