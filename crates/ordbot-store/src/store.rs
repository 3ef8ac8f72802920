//! In-memory order store keyed by order number

use std::collections::BTreeMap;
use tracing::debug;

use crate::order::{OrderOutcome, ProductOrder, CANCELLED};

/// In-memory registry of product orders.
///
/// The backing map is ordered by order number, so product-name scans have a
/// deterministic first-match even when a name appears on several orders.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: BTreeMap<String, ProductOrder>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or silently replace the record at its order-number key
    pub fn save(&mut self, order: ProductOrder) {
        debug!(order_number = %order.order_number, "Saving order");
        self.orders.insert(order.order_number.clone(), order);
    }

    /// First record matching the product name, in container order
    pub fn find_by_product_name(&self, product_name: &str) -> Option<&ProductOrder> {
        self.orders
            .values()
            .find(|order| order.product_name == product_name)
    }

    /// Shipping status lookup by product name
    pub fn get_shipping_status(&self, product_name: &str) -> OrderOutcome {
        match self.find_by_product_name(product_name) {
            Some(order) => OrderOutcome::Found {
                order_number: order.order_number.clone(),
                product_name: order.product_name.clone(),
                shipping_status: order.shipping_status.clone(),
            },
            None => OrderOutcome::Missing {
                message: format!("order for '{}' not found", product_name),
            },
        }
    }

    /// Cancel the order matching the product name.
    ///
    /// Overwrites the stored record's status in place. Cancelling an
    /// already-cancelled order is accepted and reports the same status.
    pub fn cancel(&mut self, product_name: &str) -> OrderOutcome {
        let key = self
            .find_by_product_name(product_name)
            .map(|order| order.order_number.clone());

        match key.and_then(|k| self.orders.get_mut(&k)) {
            Some(order) => {
                order.shipping_status = CANCELLED.to_string();
                debug!(order_number = %order.order_number, product_name, "Cancelled order");
                OrderOutcome::Found {
                    order_number: order.order_number.clone(),
                    product_name: order.product_name.clone(),
                    shipping_status: order.shipping_status.clone(),
                }
            }
            None => OrderOutcome::Missing {
                message: format!("no order exists for '{}' to cancel", product_name),
            },
        }
    }

    /// All records in container order
    pub fn list_all(&self) -> Vec<ProductOrder> {
        self.orders.values().cloned().collect()
    }

    /// Remove all records. Test teardown convenience.
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
