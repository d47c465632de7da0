//! Purchase transaction aggregate and related types.

mod aggregate;
mod commands;
mod line_item;
mod projection;
mod service;
mod value_objects;

pub use aggregate::PurchaseTransaction;
pub use commands::*;
pub use line_item::{LineItem, LineItemBuilder};
pub use projection::PurchaseTransactionStripped;
pub use service::PurchaseTransactionService;
pub use value_objects::{LineItemId, Price, PurchaseTransactionId, StoreId};
