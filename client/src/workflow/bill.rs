//! Bill creation workflow
//!
//! Drives one [`DraftBill`] through start, line entry and save:
//!
//! ```text
//! not_started --start--> started --save--> submitting --all acked--> completed
//!                          |                   |  ^
//!                          |                   +--+ save again resumes at the cursor
//!                          +------cancel------>+--------> cancelled
//! ```
//!
//! Saving posts one line at a time and waits for each acknowledgement before
//! sending the next, so the server applies stock changes in insertion order.
//! The first rejection stops the loop; acknowledged lines have already left
//! the draft and are never sent again. Nothing is rolled back server-side.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{BillStatus, BillType, Catalog, DraftBill, DraftLineItem, TransitionError};

use crate::api::BillApi;
use crate::error::{ClientError, ClientResult};

const START_FAILED: &str = "Failed to start bill";
const ADD_FAILED: &str = "Failed to add item to bill";

/// How far a save got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionProgress {
    pub committed: usize,
    pub total: usize,
}

/// Result of a fully acknowledged save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub bill_id: String,
    pub bill_type: BillType,
    pub lines: Vec<DraftLineItem>,
    pub grand_total: Decimal,
}

/// Raises the busy flag for one request; lowered on drop, so a dropped
/// future never leaves the workflow stuck
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Controller for a single draft bill
pub struct BillWorkflow {
    api: Arc<dyn BillApi>,
    draft: DraftBill,
    in_flight: bool,
    last_error: Option<String>,
}

impl BillWorkflow {
    pub fn new(api: Arc<dyn BillApi>, bill_type: BillType) -> Self {
        Self {
            api,
            draft: DraftBill::new(bill_type),
            in_flight: false,
            last_error: None,
        }
    }

    pub fn draft(&self) -> &DraftBill {
        &self.draft
    }

    pub fn status(&self) -> BillStatus {
        self.draft.status()
    }

    pub fn bill_id(&self) -> Option<&str> {
        self.draft.bill_id()
    }

    pub fn line_items(&self) -> &[DraftLineItem] {
        self.draft.line_items()
    }

    /// Total of the lines not yet acknowledged by the server
    pub fn grand_total(&self) -> Decimal {
        self.draft.grand_total()
    }

    /// True while a request is outstanding; the save control stays disabled
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// The message to show for the most recent failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn progress(&self) -> SubmissionProgress {
        let committed = self.draft.committed().len();
        SubmissionProgress {
            committed,
            total: committed + self.draft.line_items().len(),
        }
    }

    /// Open the bill on the server and keep its id
    pub async fn start(&mut self) -> ClientResult<&str> {
        self.guard_idle()?;
        self.last_error = None;
        let status = self.draft.status();
        if status != BillStatus::NotStarted {
            let err = TransitionError {
                action: "start",
                status,
            };
            return Err(self.reject(err.into(), START_FAILED));
        }

        let bill_type = self.draft.bill_type();
        let response = {
            let _busy = InFlight::new(&mut self.in_flight);
            self.api.start_bill(bill_type).await
        };

        match response {
            Ok(started) => {
                self.draft.begin(started.bill_id)?;
                tracing::info!(
                    bill_id = self.draft.bill_id().unwrap_or_default(),
                    bill_type = %bill_type,
                    "Bill started"
                );
                Ok(self.draft.bill_id().unwrap_or_default())
            }
            Err(e) => Err(self.reject(e, START_FAILED)),
        }
    }

    /// Validate and append a line locally. No network call.
    pub fn add_line_item<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        model_number: &str,
        quantity: i64,
    ) -> ClientResult<&DraftLineItem> {
        self.guard_idle()?;
        self.last_error = None;

        let added = self
            .draft
            .add_line_item(catalog, model_number, quantity)
            .map(|_| ());
        if let Err(e) = added {
            return Err(self.reject(e.into(), ADD_FAILED));
        }

        let line = &self.draft.line_items()[self.draft.line_items().len() - 1];
        tracing::debug!(
            model_number = %line.model_number,
            quantity = line.quantity,
            line_total = %line.line_total,
            "Line item added"
        );
        Ok(line)
    }

    /// Drop every line item of a started bill
    pub fn clear_line_items(&mut self) -> ClientResult<()> {
        self.guard_idle()?;
        self.draft.clear_line_items()?;
        self.last_error = None;
        Ok(())
    }

    /// Send the pending lines one by one.
    ///
    /// On failure the status stays `submitting` with the unsent lines still
    /// in the draft; calling `save` again resumes from the first of them.
    pub async fn save(&mut self) -> ClientResult<SaveOutcome> {
        self.guard_idle()?;
        self.last_error = None;

        if self.draft.status() == BillStatus::Started && self.draft.is_empty() {
            return Err(self.reject(
                ClientError::Validation("Add at least one item before saving the bill".to_string()),
                ADD_FAILED,
            ));
        }
        if let Err(e) = self.draft.begin_submission() {
            return Err(self.reject(e.into(), ADD_FAILED));
        }

        let bill_id = self.draft.bill_id().unwrap_or_default().to_string();
        let bill_type = self.draft.bill_type();
        tracing::info!(
            bill_id = %bill_id,
            pending = self.draft.line_items().len(),
            already_committed = self.draft.committed().len(),
            "Saving bill"
        );

        while let Some(action) = self.draft.next_pending() {
            let result = {
                let _busy = InFlight::new(&mut self.in_flight);
                self.api.add_item_to_bill(&action).await
            };

            match result {
                Ok(_) => {
                    self.draft.commit_next();
                }
                Err(e) => {
                    let progress = self.progress();
                    tracing::warn!(
                        bill_id = %bill_id,
                        model_number = %action.model_number,
                        committed = progress.committed,
                        total = progress.total,
                        "Bill save stopped; committed lines were not rolled back"
                    );
                    return Err(self.reject(e, ADD_FAILED));
                }
            }
        }

        let committed_total = self.draft.committed_total();
        let lines = self.draft.complete()?;
        tracing::info!(bill_id = %bill_id, lines = lines.len(), "Bill saved");

        Ok(SaveOutcome {
            bill_id,
            bill_type,
            lines,
            grand_total: committed_total,
        })
    }

    /// Abandon the draft. The server is not told; an opened bill stays there.
    pub fn cancel(&mut self) -> ClientResult<()> {
        self.guard_idle()?;
        self.draft.cancel()?;
        self.last_error = None;
        tracing::info!(bill_id = self.draft.bill_id().unwrap_or_default(), "Bill cancelled");
        Ok(())
    }

    fn guard_idle(&self) -> ClientResult<()> {
        if self.in_flight {
            return Err(ClientError::Busy);
        }
        Ok(())
    }

    fn reject(&mut self, error: ClientError, fallback: &str) -> ClientError {
        self.last_error = Some(error.user_message(fallback));
        error
    }
}
