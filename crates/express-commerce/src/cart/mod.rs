//! Shopping cart module.
//!
//! Contains the cart line and state types and the persisted cart store.

mod line;
mod store;

pub use line::{CartLine, CartState};
pub use store::{AddOutcome, CartStore, CartSummary, ChangeOutcome, CouponStatus};
