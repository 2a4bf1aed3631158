//! Order notification layout.

use serde::{Deserialize, Serialize};
use sw_schemas::Order;

pub const NEW_ORDER_TITLE: &str = "🎉 New Etsy Order!";
pub const MONITORING_STARTED_TEXT: &str = "📦 Etsy order monitoring started!";
pub const MANUAL_CHECK_TEXT: &str = "Checking for recent orders...";
/// Shown when the buyer name or status is absent.
pub const UNKNOWN_PLACEHOLDER: &str = "N/A";
/// Green.
pub const NEW_ORDER_COLOR: u32 = 0x2E_CC_71;

/// One rich message, serialized in the chat platform's embed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    /// RFC 3339, UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: true,
        }
    }
}

impl Embed {
    /// Value of the field called `name`, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

fn or_placeholder(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

/// Build the new-order message for `order`.
pub fn render_order_embed(order: &Order) -> Embed {
    Embed {
        title: NEW_ORDER_TITLE.to_string(),
        color: NEW_ORDER_COLOR,
        timestamp: order.created_at_utc().map(|t| t.to_rfc3339()),
        fields: vec![
            EmbedField::inline("Order ID", order.id.to_string()),
            EmbedField::inline("Total", order.total.render()),
            EmbedField::inline("Buyer", or_placeholder(order.buyer_name.as_deref())),
            EmbedField::inline("Status", or_placeholder(order.status.as_deref())),
        ],
    }
}
