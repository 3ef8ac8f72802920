//! Tool menu and closed dispatch enum
//!
//! The menu offered to the reasoning service is fixed; incoming call
//! requests are parsed into `ToolInvocation` variants so the operation set
//! is exhaustively checkable instead of dispatched by string lookup.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use ordbot_llm::ToolDefinition;
use ordbot_store::OrderStore;

/// Build the declared tool menu
pub fn build_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_orders".to_string(),
            description: "List the user's product orders.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        ToolDefinition {
            name: "get_shipping_status".to_string(),
            description: "Look up the shipping status of a specific product.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_name": {
                        "type": "string",
                        "description": "Name of the product to check"
                    }
                },
                "required": ["product_name"]
            }),
        },
        ToolDefinition {
            name: "cancel_order".to_string(),
            description: "Cancel the order for a specific product.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_name": {
                        "type": "string",
                        "description": "Name of the product whose order should be cancelled"
                    }
                },
                "required": ["product_name"]
            }),
        },
    ]
}

/// Typed arguments for the product-name operations.
///
/// Fields default so that an empty or malformed payload still yields a
/// usable argument set; a blank product name then produces a not-found
/// result downstream instead of aborting the turn.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProductNameArgs {
    #[serde(default)]
    pub product_name: String,
}

/// One call request resolved against the declared menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    ListOrders,
    GetShippingStatus(ProductNameArgs),
    CancelOrder(ProductNameArgs),
    Unsupported { name: String },
}

impl ToolInvocation {
    /// Resolve an operation name and raw argument payload.
    ///
    /// Unknown names become `Unsupported`; an unparseable payload is
    /// replaced by an empty argument set rather than failing the turn.
    pub fn parse(name: &str, raw_arguments: &str) -> Self {
        let arguments = parse_arguments(name, raw_arguments);

        match name {
            "list_orders" => ToolInvocation::ListOrders,
            "get_shipping_status" => {
                ToolInvocation::GetShippingStatus(product_name_args(arguments))
            }
            "cancel_order" => ToolInvocation::CancelOrder(product_name_args(arguments)),
            other => ToolInvocation::Unsupported {
                name: other.to_string(),
            },
        }
    }

    /// Execute against the store. Total: local failures come back as
    /// `{success: false}` payloads, never as errors.
    pub fn execute(&self, store: &mut OrderStore) -> Value {
        match self {
            ToolInvocation::ListOrders => json!({ "orders": store.list_all() }),
            ToolInvocation::GetShippingStatus(args) => {
                store.get_shipping_status(&args.product_name).to_value()
            }
            ToolInvocation::CancelOrder(args) => store.cancel(&args.product_name).to_value(),
            ToolInvocation::Unsupported { name } => json!({
                "success": false,
                "message": format!("unsupported operation '{}'", name),
            }),
        }
    }

    /// Operation name as declared in the menu
    pub fn name(&self) -> &str {
        match self {
            ToolInvocation::ListOrders => "list_orders",
            ToolInvocation::GetShippingStatus(_) => "get_shipping_status",
            ToolInvocation::CancelOrder(_) => "cancel_order",
            ToolInvocation::Unsupported { name } => name,
        }
    }
}

fn parse_arguments(name: &str, raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = name, error = %e, "Malformed tool arguments, using empty set");
            json!({})
        }
    }
}

fn product_name_args(arguments: Value) -> ProductNameArgs {
    serde_json::from_value(arguments).unwrap_or_default()
}
