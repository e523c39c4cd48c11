//! Stockbill inventory and billing admin client
//!
//! Talks to the inventory REST backend: typed API gateway, session and
//! catalog stores, the bill creation workflow, and the list views behind the
//! `stockbill` command-line shell.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod session;
pub mod stores;
pub mod views;
pub mod workflow;

pub use config::Config;
pub use context::AppContext;
pub use error::{ClientError, ClientResult};
