//! Order API handlers.
//!
//! # Endpoints
//!
//! - `POST /orders`                      – create a paylink order
//! - `GET  /orders/{reference}/status`   – poll order status

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use oplk_core::ledger::LedgerError;
use oplk_sdk::amount::{self, AmountError};
use oplk_sdk::objects::{
    CreateOrderRequest, CreateOrderResponse, ErrorResponse, OrderStatusResponse,
};

use crate::state::AppState;

/// Description used when the client supplies none.
const DEFAULT_DESCRIPTION: &str = "Paylink order";

/// Build the order API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{reference}/status", get(order_status))
}

/// `POST /orders` — create a new paylink order.
///
/// Converts the major-unit amount string to minor units, then drives the
/// ledger's creation path. Returns `201` with the reference and the
/// gateway-hosted checkout URL.
async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let amount_minor_units = amount::to_minor_units(&body.amount).map_err(ApiError::Amount)?;
    let description = body.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION);

    let created = state
        .ledger
        .create_order(amount_minor_units, &state.currency, description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            reference: created.reference,
            checkout_url: created.checkout_url,
        }),
    ))
}

/// `GET /orders/{reference}/status` — poll order status.
///
/// Terminal orders answer from the store; open orders are reconciled
/// against the gateway first.
async fn order_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.ledger.poll_status(&reference).await?;
    Ok(Json(OrderStatusResponse {
        reference,
        status: status.into(),
    }))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in order API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The boundary amount string did not convert.
    Amount(AmountError),
    /// A ledger operation failed.
    Ledger(LedgerError),
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        ApiError::Ledger(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Amount(e) => {
                tracing::debug!(error = %e, "rejected order amount");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Ledger(LedgerError::InvalidAmount) => {
                tracing::debug!("rejected non-positive order amount");
                (StatusCode::BAD_REQUEST, LedgerError::InvalidAmount.to_string())
            }
            ApiError::Ledger(LedgerError::NotFound) => {
                (StatusCode::NOT_FOUND, "order not found".to_string())
            }
            ApiError::Ledger(LedgerError::Timeout) => {
                tracing::warn!("gateway call timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "payment gateway timed out".to_string(),
                )
            }
            ApiError::Ledger(LedgerError::Gateway(e)) => {
                tracing::error!(error = %e, "gateway failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "payment gateway request failed".to_string(),
                )
            }
            ApiError::Ledger(LedgerError::Store(e)) => {
                tracing::error!(error = %e, "order store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Ledger(LedgerError::Internal(detail)) => {
                tracing::error!(detail, "internal invariant violated");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
