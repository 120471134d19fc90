//! Application state shared across all request handlers.

use oplk_core::ledger::OrderLedger;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// The order lifecycle manager.
    pub ledger: Arc<OrderLedger>,
    /// The single currency this deployment charges in.
    pub currency: Arc<str>,
    /// Bearer token for the admin API; `None` disables it.
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(ledger: Arc<OrderLedger>, currency: &str, admin_token: Option<&str>) -> Self {
        Self {
            ledger,
            currency: Arc::from(currency),
            admin_token: admin_token.map(Arc::from),
        }
    }
}
