//! Shared types and models for the Stockbill inventory and billing client
//!
//! This crate contains the REST wire models, the in-memory Draft Bill, and
//! the validation and formatting helpers used by both the native client and
//! the browser (WASM) build.

pub mod draft;
pub mod models;
pub mod session;
pub mod types;
pub mod validation;

pub use draft::*;
pub use models::*;
pub use session::*;
pub use types::*;
pub use validation::*;
