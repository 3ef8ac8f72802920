//! Order record and lookup outcome types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Status token for an order that is on its way
pub const SHIPPING: &str = "shipping";
/// Status token for an order still being prepared
pub const PREPARING: &str = "preparing";
/// Status token written by a cancellation
pub const CANCELLED: &str = "cancelled";

/// A single product order.
///
/// The status field is enum-like but open: the constants above cover the
/// known lifecycle, any other string is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOrder {
    pub order_number: String,
    pub product_name: String,
    pub shipping_address: String,
    pub shipping_status: String,
}

impl ProductOrder {
    pub fn new(
        order_number: impl Into<String>,
        product_name: impl Into<String>,
        shipping_address: impl Into<String>,
        shipping_status: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            product_name: product_name.into(),
            shipping_address: shipping_address.into(),
            shipping_status: shipping_status.into(),
        }
    }
}

/// Outcome of a product-name lookup operation.
///
/// Misses are data, not errors: they serialize to a `{success: false}`
/// payload that is fed back into the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Found {
        order_number: String,
        product_name: String,
        shipping_status: String,
    },
    Missing {
        message: String,
    },
}

impl OrderOutcome {
    pub fn success(&self) -> bool {
        matches!(self, OrderOutcome::Found { .. })
    }

    /// Shipping status of the matched order, if any
    pub fn shipping_status(&self) -> Option<&str> {
        match self {
            OrderOutcome::Found { shipping_status, .. } => Some(shipping_status),
            OrderOutcome::Missing { .. } => None,
        }
    }

    /// Project to the wire shape consumed by the reasoning service
    pub fn to_value(&self) -> Value {
        match self {
            OrderOutcome::Found {
                order_number,
                product_name,
                shipping_status,
            } => json!({
                "success": true,
                "order_number": order_number,
                "product_name": product_name,
                "shipping_status": shipping_status,
            }),
            OrderOutcome::Missing { message } => json!({
                "success": false,
                "message": message,
            }),
        }
    }
}
