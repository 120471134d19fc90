pub mod orders;
pub mod webhook;

pub use orders::{
    CreateOrderRequest, CreateOrderResponse, ErrorResponse, OrderStatus, OrderStatusResponse,
};
pub use webhook::{ExchangeNotification, ExchangeObject, ExchangeStatus, WebhookAck};
