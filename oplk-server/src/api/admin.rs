//! Admin API handlers.
//!
//! Operator endpoints, guarded by the configured bearer token.
//!
//! # Endpoints
//!
//! - `POST /admin/orders/{reference}/mark-paid` – force an order to `PAID`

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use oplk_sdk::objects::OrderStatusResponse;

use super::extractors::AdminToken;
use super::orders::ApiError;
use crate::state::AppState;

/// Build the admin API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/orders/{reference}/mark-paid", post(mark_paid))
}

/// `POST /admin/orders/{reference}/mark-paid` — operator override.
///
/// Applies a `PAID` observation through the normal reconciliation rule:
/// a record that already reached a terminal status is left as it is and
/// that status is returned.
async fn mark_paid(
    State(state): State<AppState>,
    _token: AdminToken,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.ledger.mark_paid(&reference).await?;
    Ok(Json(OrderStatusResponse {
        reference,
        status: status.into(),
    }))
}
