//! Identifier primitives shared across the purchase tracking crates.

mod id;

pub use id::new_sequential_id;
pub use uuid::{self, Uuid};
