use serde::{Deserialize, Serialize};
use url::Url;

/// Request payload for creating a new paylink order.
///
/// `amount` is a major-unit decimal string (`"19.99"`); see
/// [`crate::amount::to_minor_units`] for the conversion contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response returned by the "create order" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Locally generated order reference.
    pub reference: String,
    /// Gateway-hosted checkout page for this order.
    pub checkout_url: Url,
}

/// Response returned by the "order status" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub reference: String,
    pub status: OrderStatus,
}

/// Error body for non-2xx API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Order status for API responses.
///
/// This is the API/DTO version. For storage, see the enum in
/// `oplk-core::entities`, which has no `Unknown` variant. `Unknown` exists
/// only in the wire vocabulary and doubles as the deserialization fallback
/// for status strings this SDK does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Failed => write!(f, "FAILED"),
            OrderStatus::Expired => write!(f, "EXPIRED"),
            OrderStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
