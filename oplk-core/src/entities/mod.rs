pub mod order_record;

pub use order_record::OrderRecord;

use oplk_sdk::objects::OrderStatus as SdkOrderStatus;

/// Order status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `oplk_sdk::objects::OrderStatus`; the `UNKNOWN` vocabulary entry exists
/// only there and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl OrderStatus {
    /// Terminal statuses are sticky: once a record is `Paid`, `Failed`, or
    /// `Expired`, no later observation may change it.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl From<OrderStatus> for SdkOrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => SdkOrderStatus::Pending,
            OrderStatus::Paid => SdkOrderStatus::Paid,
            OrderStatus::Failed => SdkOrderStatus::Failed,
            OrderStatus::Expired => SdkOrderStatus::Expired,
        }
    }
}
