//! Bill endpoints

use shared::{Bill, BillItemAction, BillType, PrintBillResponse, StartBillResponse};

use super::{segment_path, ApiGateway};
use crate::error::ClientResult;

impl ApiGateway {
    pub async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        self.get("/bill/").await
    }

    /// Open a new server-side bill and get its id
    pub async fn start_bill(&self, bill_type: BillType) -> ClientResult<StartBillResponse> {
        self.post_empty("/bill/start", &[("bill_type", bill_type.as_str())])
            .await
    }

    /// Add one line to a started bill. The acknowledgement body is free-form.
    pub async fn add_item_to_bill(&self, action: &BillItemAction) -> ClientResult<serde_json::Value> {
        self.post_json("/bill/item", action).await
    }

    /// Fetch a persisted bill for viewing or printing
    pub async fn print_bill(&self, bill_id: &str) -> ClientResult<PrintBillResponse> {
        self.get(&segment_path("/bill/", &[bill_id])?).await
    }
}
