//! ordbot-store: in-memory product order registry
//!
//! Orders are keyed by order number; the product name acts as a secondary
//! lookup key for the tool operations. The store is single-threaded by
//! design - callers that share it across tasks serialize access externally.

pub mod order;
pub mod store;

pub use order::{OrderOutcome, ProductOrder, CANCELLED, PREPARING, SHIPPING};
pub use store::OrderStore;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::order::{OrderOutcome, ProductOrder};
    pub use super::store::OrderStore;
}
