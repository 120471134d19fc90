use time::OffsetDateTime;

use super::OrderStatus;

/// The sole persisted entity: one row per locally generated reference.
///
/// Records are never deleted by the core; expiry is an operational concern
/// of the backing store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    /// Locally generated external identifier, assigned exactly once.
    pub reference: String,
    /// Gateway-assigned order id; `None` until (unless) remote creation
    /// succeeds. Once set it is never overwritten.
    pub upstream_order_id: Option<String>,
    /// Amount in the smallest currency unit.
    pub amount_minor_units: i64,
    pub currency: String,
    pub description: String,
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl OrderRecord {
    /// A freshly created order whose remote counterpart exists.
    pub fn new_pending(
        reference: String,
        upstream_order_id: String,
        amount_minor_units: i64,
        currency: &str,
        description: &str,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            reference,
            upstream_order_id: Some(upstream_order_id),
            amount_minor_units,
            currency: currency.to_owned(),
            description: description.to_owned(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The audit record retained when remote creation failed: terminal from
    /// birth, with no upstream counterpart.
    pub fn new_failed(
        reference: String,
        amount_minor_units: i64,
        currency: &str,
        description: &str,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            reference,
            upstream_order_id: None,
            amount_minor_units,
            currency: currency.to_owned(),
            description: description.to_owned(),
            status: OrderStatus::Failed,
            created_at: now,
            updated_at: now,
        }
    }
}
