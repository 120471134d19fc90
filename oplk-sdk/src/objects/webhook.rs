//! Wire shapes for the provider's asynchronous exchange notifications.
//!
//! The gateway POSTs a JSON body whose `object` mirrors its order-status
//! response. Every field is optional: the provider varies the payload by
//! event type, and the webhook endpoint must acknowledge whatever arrives.

use serde::{Deserialize, Serialize};

/// Top-level webhook notification body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeNotification {
    #[serde(default)]
    pub object: Option<ExchangeObject>,
}

/// The order object embedded in a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeObject {
    /// The reference this system generated at order creation.
    #[serde(default)]
    pub reference: Option<String>,
    /// The gateway-assigned order id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<ExchangeStatus>,
}

/// Raw provider status pair, classified by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeStatus {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Unconditional acknowledgment body for webhook deliveries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WebhookAck {
    pub ok: bool,
}
