//! The Order Lifecycle Manager.
//!
//! `OrderLedger` is the one write path for order state: it creates orders
//! against the upstream gateway, applies webhook observations, and
//! reconciles polling results, all through the same classification and
//! terminal-state rule, so duplicate and racing events collapse into a
//! single deterministic outcome. The ledger itself is stateless; any number
//! of instances may run concurrently over one shared [`OrderStore`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::entities::{OrderRecord, OrderStatus};
use crate::gateway::{self, GatewayError, PaymentGateway, RemoteOrderRequest};
use crate::reconcile::{apply_observation, classify};
use crate::reference;
use crate::store::{OrderStore, StoreError};

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The amount is zero or negative.
    #[error("amount must be a positive number of minor units")]
    InvalidAmount,

    /// No record exists for the given reference.
    #[error("order not found")]
    NotFound,

    /// The gateway call did not complete within the configured deadline.
    #[error("upstream gateway call timed out")]
    Timeout,

    /// The gateway call completed and failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The order store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An invariant this system guarantees was violated.
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

/// Result of a successful order creation.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub reference: String,
    pub checkout_url: Url,
}

/// The order lifecycle state machine over a store and a gateway.
pub struct OrderLedger {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    gateway_timeout: Duration,
}

impl OrderLedger {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            gateway_timeout,
        }
    }

    /// Create a new order: generate a reference, create the remote order,
    /// persist the record.
    ///
    /// The reference is assigned before the upstream call and survives its
    /// failure: a failed creation leaves an auditable `FAILED` record
    /// behind, never nothing. Creation is not idempotent-retried; a second
    /// call always produces a new reference.
    pub async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        description: &str,
    ) -> Result<CreatedOrder, LedgerError> {
        if amount_minor_units <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let reference = reference::generate();
        let description = gateway::truncate_description(description);

        let request = RemoteOrderRequest {
            amount_minor_units,
            currency: currency.to_owned(),
            description: description.clone(),
            reference: reference.clone(),
        };

        let remote = match timeout(
            self.gateway_timeout,
            self.gateway.create_remote_order(request),
        )
        .await
        {
            Ok(Ok(remote)) => remote,
            Ok(Err(gateway_error)) => {
                warn!(%reference, error = %gateway_error, "remote order creation failed");
                self.record_failed_attempt(&reference, amount_minor_units, currency, &description)
                    .await;
                return Err(gateway_error.into());
            }
            Err(_elapsed) => {
                warn!(%reference, timeout = ?self.gateway_timeout, "remote order creation timed out");
                self.record_failed_attempt(&reference, amount_minor_units, currency, &description)
                    .await;
                return Err(LedgerError::Timeout);
            }
        };

        let record = OrderRecord::new_pending(
            reference.clone(),
            remote.upstream_order_id.clone(),
            amount_minor_units,
            currency,
            &description,
        );

        match self.store.create(record).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists) => {
                error!(%reference, "freshly generated reference collided in the store");
                return Err(LedgerError::Internal("order reference collision"));
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            %reference,
            upstream_order_id = %remote.upstream_order_id,
            amount_minor_units,
            "order created"
        );

        Ok(CreatedOrder {
            reference,
            checkout_url: remote.checkout_url,
        })
    }

    /// Apply one webhook observation. Never fails upward: the provider
    /// retries indefinitely on anything but an acknowledgment, so every
    /// internal outcome (including an unknown reference) is logged and
    /// absorbed here.
    ///
    /// A webhook for a reference this system never issued does not create a
    /// record; webhook payloads are not a trusted creation path.
    pub async fn ingest_webhook_event(
        &self,
        reference: &str,
        upstream_order_id: Option<&str>,
        raw_action: Option<&str>,
        raw_code: Option<i64>,
    ) {
        let observed = classify(raw_action, raw_code);
        let seen_id = upstream_order_id.map(str::to_owned);
        let mutate = move |record: &mut OrderRecord| {
            apply_observation(record, observed, seen_id.as_deref());
        };

        match self.store.update(reference, &mutate).await {
            Ok(Some(record)) => {
                debug!(
                    %reference,
                    raw_action,
                    raw_code,
                    status = ?record.status,
                    "webhook event reconciled"
                );
            }
            Ok(None) => {
                info!(%reference, raw_action, raw_code, "webhook for unknown reference ignored");
            }
            Err(store_error) => {
                error!(%reference, error = %store_error, "failed to apply webhook event");
            }
        }
    }

    /// Current status of an order, reconciled against the gateway when the
    /// stored state is still open.
    ///
    /// Terminal records short-circuit without a gateway call. A gateway
    /// failure or timeout degrades to the last known stored status instead
    /// of propagating.
    pub async fn poll_status(&self, reference: &str) -> Result<OrderStatus, LedgerError> {
        let record = self
            .store
            .get(reference)
            .await?
            .ok_or(LedgerError::NotFound)?;

        if record.status.is_terminal() {
            return Ok(record.status);
        }

        let Some(upstream_order_id) = record.upstream_order_id.clone() else {
            // open record with no remote counterpart: nothing to reconcile
            return Ok(record.status);
        };

        let remote = match timeout(
            self.gateway_timeout,
            self.gateway.fetch_remote_status(&upstream_order_id),
        )
        .await
        {
            Ok(Ok(remote)) => remote,
            Ok(Err(gateway_error)) => {
                warn!(%reference, error = %gateway_error, "status poll failed, returning stored status");
                return Ok(record.status);
            }
            Err(_elapsed) => {
                warn!(%reference, timeout = ?self.gateway_timeout, "status poll timed out, returning stored status");
                return Ok(record.status);
            }
        };

        let observed = classify(remote.raw_action.as_deref(), remote.raw_code);
        let mutate =
            move |record: &mut OrderRecord| apply_observation(record, observed, None);

        match self.store.update(reference, &mutate).await? {
            Some(updated) => Ok(updated.status),
            // the store never deletes; treat a vanished row as unchanged
            None => Ok(record.status),
        }
    }

    /// Operator override: force a `PAID` observation through the normal
    /// reconciliation rule. A terminal record is a no-op and the existing
    /// status is returned.
    pub async fn mark_paid(&self, reference: &str) -> Result<OrderStatus, LedgerError> {
        let mutate = |record: &mut OrderRecord| {
            apply_observation(record, OrderStatus::Paid, None);
        };
        match self.store.update(reference, &mutate).await? {
            Some(record) => {
                info!(%reference, status = ?record.status, "operator mark-paid applied");
                Ok(record.status)
            }
            None => Err(LedgerError::NotFound),
        }
    }

    /// Persist the audit record for a failed creation attempt. The gateway
    /// error is what the caller sees; a store failure here is logged, not
    /// surfaced, so it cannot mask the original cause.
    async fn record_failed_attempt(
        &self,
        reference: &str,
        amount_minor_units: i64,
        currency: &str,
        description: &str,
    ) {
        let record = OrderRecord::new_failed(
            reference.to_owned(),
            amount_minor_units,
            currency,
            description,
        );
        match self.store.create(record).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists) => {
                error!(%reference, "reference collision while recording failed creation");
            }
            Err(store_error) => {
                error!(%reference, error = %store_error, "failed to record failed creation attempt");
            }
        }
    }
}
