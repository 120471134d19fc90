//! End-to-end ledger behavior over the in-memory store and a stub gateway.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use oplk_core::entities::OrderStatus;
use oplk_core::gateway::{
    GatewayError, PaymentGateway, RemoteOrder, RemoteOrderRequest, RemoteStatus,
};
use oplk_core::ledger::{LedgerError, OrderLedger};
use oplk_core::store::{MemoryOrderStore, OrderStore};

/// Scriptable gateway double with call counters and injectable latency.
struct StubGateway {
    create_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fail_create: bool,
    create_delay: Duration,
    fail_status: bool,
    status_delay: Duration,
    status_reply: (Option<String>, Option<i64>),
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_create: false,
            create_delay: Duration::ZERO,
            fail_status: false,
            status_delay: Duration::ZERO,
            status_reply: (None, None),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_remote_order(
        &self,
        _request: RemoteOrderRequest,
    ) -> Result<RemoteOrder, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        if self.fail_create {
            return Err(GatewayError::Rejected {
                status: 503,
                body: "service unavailable".into(),
            });
        }
        Ok(RemoteOrder {
            upstream_order_id: "X1".into(),
            checkout_url: Url::parse("https://pay/x1").unwrap(),
        })
    }

    async fn fetch_remote_status(
        &self,
        _upstream_order_id: &str,
    ) -> Result<RemoteStatus, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        if self.fail_status {
            return Err(GatewayError::Rejected {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        let (action, code) = self.status_reply.clone();
        Ok(RemoteStatus {
            raw_action: action,
            raw_code: code,
        })
    }
}

fn ledger_with(
    store: Arc<MemoryOrderStore>,
    gateway: Arc<StubGateway>,
) -> OrderLedger {
    OrderLedger::new(store, gateway, Duration::from_millis(250))
}

#[tokio::test]
async fn creation_persists_a_pending_record_with_the_upstream_id() {
    let store = Arc::new(MemoryOrderStore::new());
    let ledger = ledger_with(store.clone(), Arc::new(StubGateway::default()));

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();
    assert_eq!(created.checkout_url.as_str(), "https://pay/x1");

    let record = store.get(&created.reference).await.unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Pending);
    assert_eq!(record.upstream_order_id.as_deref(), Some("X1"));
    assert_eq!(record.amount_minor_units, 150);
    assert_eq!(record.currency, "EUR");
    assert_eq!(record.description, "coffee");
}

#[tokio::test]
async fn non_positive_amounts_are_rejected_before_any_gateway_call() {
    let gateway = Arc::new(StubGateway::default());
    let ledger = ledger_with(Arc::new(MemoryOrderStore::new()), gateway.clone());

    for amount in [0, -1, -150] {
        assert!(matches!(
            ledger.create_order(amount, "EUR", "coffee").await,
            Err(LedgerError::InvalidAmount)
        ));
    }
    assert_eq!(gateway.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gateway_failure_leaves_an_auditable_failed_record() {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        fail_create: true,
        ..StubGateway::default()
    });
    let ledger = ledger_with(store.clone(), gateway);

    let result = ledger.create_order(150, "EUR", "coffee").await;
    assert!(matches!(result, Err(LedgerError::Gateway(_))));

    // exactly one record was written: terminal from birth, no upstream id
    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, OrderStatus::Failed);
    assert_eq!(records[0].upstream_order_id, None);
    assert_eq!(records[0].amount_minor_units, 150);
}

#[tokio::test]
async fn gateway_timeout_is_classified_as_timeout() {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        create_delay: Duration::from_secs(2),
        ..StubGateway::default()
    });
    let ledger = OrderLedger::new(store, gateway, Duration::from_millis(20));

    assert!(matches!(
        ledger.create_order(150, "EUR", "coffee").await,
        Err(LedgerError::Timeout)
    ));
}

#[tokio::test]
async fn concurrent_creations_yield_distinct_references() {
    let store = Arc::new(MemoryOrderStore::new());
    let ledger = Arc::new(ledger_with(store, Arc::new(StubGateway::default())));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.create_order(100, "EUR", "load test").await.unwrap()
        }));
    }

    let mut references = HashSet::new();
    for handle in handles {
        references.insert(handle.await.unwrap().reference);
    }
    assert_eq!(references.len(), 32);
}

#[tokio::test]
async fn terminal_status_is_sticky_across_webhook_and_poll() {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        status_reply: (Some("CANCELLED".into()), None),
        ..StubGateway::default()
    });
    let ledger = ledger_with(store.clone(), gateway);

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();

    ledger
        .ingest_webhook_event(&created.reference, None, Some("PAID"), Some(100))
        .await;
    ledger
        .ingest_webhook_event(&created.reference, None, Some("CANCELLED"), None)
        .await;

    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Paid);

    let record = store.get(&created.reference).await.unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Paid);
}

#[tokio::test]
async fn webhook_for_unknown_reference_mutates_nothing() {
    let store = Arc::new(MemoryOrderStore::new());
    let ledger = ledger_with(store.clone(), Arc::new(StubGateway::default()));

    ledger
        .ingest_webhook_event("PL-NEVERISSUED", Some("ord_9"), Some("PAID"), Some(100))
        .await;

    assert!(store.get("PL-NEVERISSUED").await.unwrap().is_none());
}

#[tokio::test]
async fn polling_a_terminal_record_skips_the_gateway() {
    let gateway = Arc::new(StubGateway::default());
    let ledger = ledger_with(Arc::new(MemoryOrderStore::new()), gateway.clone());

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();
    ledger
        .ingest_webhook_event(&created.reference, None, Some("PAID"), Some(100))
        .await;

    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Paid);
    assert_eq!(gateway.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn polling_reconciles_open_records_from_the_gateway() {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        status_reply: (None, Some(100)),
        ..StubGateway::default()
    });
    let ledger = ledger_with(store.clone(), gateway.clone());

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();
    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Paid);
    assert_eq!(gateway.status_calls.load(Ordering::SeqCst), 1);

    // now terminal: further polls take the fast path
    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Paid);
    assert_eq!(gateway.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn polling_degrades_to_stored_status_when_the_gateway_fails() {
    let gateway = Arc::new(StubGateway {
        fail_status: true,
        ..StubGateway::default()
    });
    let ledger = ledger_with(Arc::new(MemoryOrderStore::new()), gateway);

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();
    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Pending);
}

#[tokio::test]
async fn polling_an_unknown_reference_is_not_found() {
    let ledger = ledger_with(Arc::new(MemoryOrderStore::new()), Arc::new(StubGateway::default()));
    assert!(matches!(
        ledger.poll_status("PL-NEVERISSUED").await,
        Err(LedgerError::NotFound)
    ));
}

#[tokio::test]
async fn racing_webhook_and_poll_converge_on_the_first_terminal_event() {
    // The gateway reports EXPIRED but only after a delay; a PAID webhook
    // lands mid-flight. The webhook's terminal status reaches the store
    // first, so the poll's late observation must become a no-op.
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        status_reply: (Some("EXPIRED".into()), None),
        status_delay: Duration::from_millis(100),
        ..StubGateway::default()
    });
    let ledger = Arc::new(ledger_with(store.clone(), gateway));

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();

    let poller = {
        let ledger = ledger.clone();
        let reference = created.reference.clone();
        tokio::spawn(async move { ledger.poll_status(&reference).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    ledger
        .ingest_webhook_event(&created.reference, None, Some("PAID"), Some(100))
        .await;

    let polled = poller.await.unwrap().unwrap();
    assert_eq!(polled, OrderStatus::Paid);

    let record = store.get(&created.reference).await.unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Paid);
}

#[tokio::test]
async fn mark_paid_applies_the_same_terminal_rule() {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(StubGateway {
        status_reply: (Some("EXPIRED".into()), None),
        ..StubGateway::default()
    });
    let ledger = ledger_with(store.clone(), gateway);

    let created = ledger.create_order(150, "EUR", "coffee").await.unwrap();
    assert_eq!(
        ledger.mark_paid(&created.reference).await.unwrap(),
        OrderStatus::Paid
    );

    // already terminal: the expired observation and a second override are no-ops
    let status = ledger.poll_status(&created.reference).await.unwrap();
    assert_eq!(status, OrderStatus::Paid);
    assert!(matches!(
        ledger.mark_paid("PL-NEVERISSUED").await,
        Err(LedgerError::NotFound)
    ));
}

#[tokio::test]
async fn long_descriptions_are_truncated_to_the_upstream_limit() {
    let store = Arc::new(MemoryOrderStore::new());
    let ledger = ledger_with(store.clone(), Arc::new(StubGateway::default()));

    let created = ledger
        .create_order(150, "EUR", &"x".repeat(200))
        .await
        .unwrap();
    let record = store.get(&created.reference).await.unwrap().unwrap();
    assert_eq!(record.description.len(), 32);
}
