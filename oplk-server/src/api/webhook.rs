//! Webhook API handler.
//!
//! The provider retries any delivery that does not come back as a 2xx
//! acknowledgment, so this endpoint acknowledges unconditionally: malformed
//! bodies, unknown references, and internal failures are all logged inside
//! the ledger and answered with `200 {ok:true}`.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use oplk_sdk::objects::{ExchangeNotification, WebhookAck};

use crate::state::AppState;

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/payment", post(payment_webhook))
}

/// `POST /webhooks/payment` — ingest a provider exchange notification.
///
/// The body is read as raw bytes rather than through the JSON extractor so
/// that a payload this server cannot parse still gets its acknowledgment.
async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> Json<WebhookAck> {
    let notification: ExchangeNotification = match serde_json::from_slice(&body) {
        Ok(notification) => notification,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook body acknowledged and dropped");
            return Json(WebhookAck { ok: true });
        }
    };

    let Some(object) = notification.object else {
        tracing::info!("webhook without order object acknowledged and dropped");
        return Json(WebhookAck { ok: true });
    };

    let reference = object
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let Some(reference) = reference else {
        tracing::info!("webhook without reference acknowledged and dropped");
        return Json(WebhookAck { ok: true });
    };

    let upstream_order_id = object
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let (raw_action, raw_code) = match object.status {
        Some(status) => (status.action, status.code),
        None => (None, None),
    };

    state
        .ledger
        .ingest_webhook_event(
            reference,
            upstream_order_id,
            raw_action.as_deref(),
            raw_code,
        )
        .await;

    Json(WebhookAck { ok: true })
}
