//! Multi-step workflows that span several API calls

pub mod bill;

pub use bill::{BillWorkflow, SaveOutcome, SubmissionProgress};
