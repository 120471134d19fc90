//! Status classification and the reconciliation rule.
//!
//! Webhook ingestion and polling reconciliation both funnel through
//! [`classify`] and [`apply_observation`], which is what makes the two paths
//! commutative: whichever classified event reaches the store first and lands
//! a terminal status wins, and the later one becomes a no-op.

use crate::entities::{OrderRecord, OrderStatus};

/// Classify a raw provider `(action, code)` pair into an order status.
///
/// The table is fixed and matched top to bottom:
///
/// | action        | code | status  |
/// |---------------|------|---------|
/// | `"PAID"`      | any  | Paid    |
/// | any           | 100  | Paid    |
/// | `"CANCELLED"` | any  | Failed  |
/// | `"EXPIRED"`   | any  | Expired |
/// | anything else | —    | Pending |
pub fn classify(raw_action: Option<&str>, raw_code: Option<i64>) -> OrderStatus {
    match (raw_action, raw_code) {
        (Some("PAID"), _) => OrderStatus::Paid,
        (_, Some(100)) => OrderStatus::Paid,
        (Some("CANCELLED"), _) => OrderStatus::Failed,
        (Some("EXPIRED"), _) => OrderStatus::Expired,
        _ => OrderStatus::Pending,
    }
}

/// Merge one observed status into a stored record.
///
/// Terminal records are left untouched. A still-pending record takes the
/// observed status; if the observation carried the gateway order id for a
/// record that has none yet, `upstream_order_id` is backfilled. An existing
/// id is never overwritten.
pub fn apply_observation(
    record: &mut OrderRecord,
    observed: OrderStatus,
    seen_upstream_id: Option<&str>,
) {
    if record.status.is_terminal() {
        return;
    }
    if let (None, Some(id)) = (&record.upstream_order_id, seen_upstream_id) {
        record.upstream_order_id = Some(id.to_owned());
    }
    record.status = observed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table_is_reproduced_exactly() {
        assert_eq!(classify(Some("PAID"), None), OrderStatus::Paid);
        assert_eq!(classify(Some("PAID"), Some(42)), OrderStatus::Paid);
        assert_eq!(classify(None, Some(100)), OrderStatus::Paid);
        assert_eq!(classify(Some("CANCELLED"), None), OrderStatus::Failed);
        assert_eq!(classify(Some("EXPIRED"), None), OrderStatus::Expired);
        assert_eq!(classify(None, None), OrderStatus::Pending);
        assert_eq!(classify(Some("PENDING"), Some(20)), OrderStatus::Pending);
        assert_eq!(classify(Some("paid"), None), OrderStatus::Pending);
    }

    #[test]
    fn earlier_rows_win_over_later_ones() {
        // code 100 outranks the CANCELLED/EXPIRED action rows
        assert_eq!(classify(Some("CANCELLED"), Some(100)), OrderStatus::Paid);
        assert_eq!(classify(Some("EXPIRED"), Some(100)), OrderStatus::Paid);
    }

    fn pending_record() -> OrderRecord {
        OrderRecord::new_pending("PL-T".into(), "up_1".into(), 100, "EUR", "test")
    }

    #[test]
    fn pending_records_take_the_observed_status() {
        let mut record = pending_record();
        apply_observation(&mut record, OrderStatus::Paid, None);
        assert_eq!(record.status, OrderStatus::Paid);
    }

    #[test]
    fn terminal_records_are_never_changed() {
        let mut record = pending_record();
        apply_observation(&mut record, OrderStatus::Paid, None);
        let snapshot = record.clone();

        apply_observation(&mut record, OrderStatus::Failed, Some("up_other"));
        assert_eq!(record, snapshot);
        apply_observation(&mut record, OrderStatus::Pending, None);
        assert_eq!(record, snapshot);
    }

    #[test]
    fn upstream_id_backfills_once_and_only_once() {
        let mut record = OrderRecord::new_failed("PL-F".into(), 100, "EUR", "test");
        // terminal: no backfill either
        apply_observation(&mut record, OrderStatus::Paid, Some("up_9"));
        assert_eq!(record.upstream_order_id, None);

        let mut record = pending_record();
        record.upstream_order_id = None;
        apply_observation(&mut record, OrderStatus::Pending, Some("up_9"));
        assert_eq!(record.upstream_order_id.as_deref(), Some("up_9"));

        apply_observation(&mut record, OrderStatus::Pending, Some("up_10"));
        assert_eq!(record.upstream_order_id.as_deref(), Some("up_9"));
    }
}
