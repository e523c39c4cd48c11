//! Domain models mirroring the inventory REST API payloads

mod alert;
mod bill;
mod category;
mod item;
mod user;

pub use alert::*;
pub use bill::*;
pub use category::*;
pub use item::*;
pub use user::*;
