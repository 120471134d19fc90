//! The Upstream Gateway Client boundary.
//!
//! The ledger depends on exactly two remote operations, create an order and
//! fetch its authoritative status, behind the [`PaymentGateway`] trait.
//! Neither is retried here: a single failed attempt surfaces to the caller,
//! and retry policy stays with the HTTP boundary or the operator.

mod paynl;

pub use paynl::{PayNlConfig, PayNlGateway};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Upstream limit on the order description field.
pub const MAX_DESCRIPTION_LEN: usize = 32;

/// Upstream limit on the merchant reference field.
pub const MAX_REFERENCE_LEN: usize = 64;

/// Errors that can occur talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed (connect, TLS, body read).
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The gateway answered 2xx but the body lacked a field the contract
    /// requires (e.g. no order id or checkout link).
    #[error("gateway response missing expected fields: {0}")]
    MalformedResponse(String),
}

/// Parameters for creating an order on the provider side.
#[derive(Debug, Clone)]
pub struct RemoteOrderRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    pub description: String,
    pub reference: String,
}

/// The provider's answer to a successful order creation.
#[derive(Debug, Clone)]
pub struct RemoteOrder {
    pub upstream_order_id: String,
    pub checkout_url: Url,
}

/// Raw provider status, classified by [`crate::reconcile::classify`].
#[derive(Debug, Clone, Default)]
pub struct RemoteStatus {
    pub raw_action: Option<String>,
    pub raw_code: Option<i64>,
}

/// External collaborator boundary to the payment service provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order/paylink on the provider side.
    async fn create_remote_order(
        &self,
        request: RemoteOrderRequest,
    ) -> Result<RemoteOrder, GatewayError>;

    /// Fetch the provider's current view of an order.
    async fn fetch_remote_status(
        &self,
        upstream_order_id: &str,
    ) -> Result<RemoteStatus, GatewayError>;
}

/// Truncate a description to the upstream limit, on a character boundary.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}
