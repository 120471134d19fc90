//! Pay.nl Orders API client.
//!
//! Amount convention: this client sends `amount.value` in **minor units**
//! (integer cents), which is what the Pay.nl Orders API expects. The
//! convention is per-provider; other gateway implementations must document
//! their own.

use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    GatewayError, MAX_REFERENCE_LEN, PaymentGateway, RemoteOrder, RemoteOrderRequest, RemoteStatus,
};

/// Configuration for the Pay.nl integration.
///
/// `service_secret` is the basic-auth password for the service id; it comes
/// from configuration, never from source.
#[derive(Debug, Clone)]
pub struct PayNlConfig {
    pub base_url: Url,
    pub service_id: String,
    pub service_secret: String,
    pub payment_method_id: u32,
}

/// [`PaymentGateway`] implementation for the Pay.nl `connect` Orders API.
pub struct PayNlGateway {
    http: reqwest::Client,
    config: PayNlConfig,
}

impl PayNlGateway {
    pub fn new(config: PayNlConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.config.base_url.as_str().trim_end_matches('/'))
    }

    fn status_url(&self, upstream_order_id: &str) -> String {
        format!(
            "{}/orders/{}/status",
            self.config.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(upstream_order_id)
        )
    }
}

// --- wire types ------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: AmountBody<'a>,
    #[serde(rename = "paymentMethod")]
    payment_method: PaymentMethodBody,
    #[serde(rename = "serviceId")]
    service_id: &'a str,
    description: &'a str,
    reference: &'a str,
}

#[derive(Debug, Serialize)]
struct AmountBody<'a> {
    value: i64,
    currency: &'a str,
}

#[derive(Debug, Serialize)]
struct PaymentMethodBody {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct CreateOrderReply {
    id: String,
    links: ReplyLinks,
}

#[derive(Debug, Deserialize)]
struct ReplyLinks {
    redirect: Url,
}

#[derive(Debug, Default, Deserialize)]
struct OrderStatusReply {
    #[serde(default)]
    status: Option<StatusBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusBlock {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl PaymentGateway for PayNlGateway {
    #[tracing::instrument(skip_all, fields(reference = %request.reference))]
    async fn create_remote_order(
        &self,
        request: RemoteOrderRequest,
    ) -> Result<RemoteOrder, GatewayError> {
        let reference: String = request.reference.chars().take(MAX_REFERENCE_LEN).collect();
        let body = CreateOrderBody {
            amount: AmountBody {
                value: request.amount_minor_units,
                currency: &request.currency,
            },
            payment_method: PaymentMethodBody {
                id: self.config.payment_method_id,
            },
            service_id: &self.config.service_id,
            description: &request.description,
            reference: &reference,
        };

        let response = self
            .http
            .post(self.orders_url())
            .basic_auth(&self.config.service_id, Some(&self.config.service_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: CreateOrderReply = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(RemoteOrder {
            upstream_order_id: reply.id,
            checkout_url: reply.links.redirect,
        })
    }

    #[tracing::instrument(skip_all, fields(upstream_order_id = %upstream_order_id))]
    async fn fetch_remote_status(
        &self,
        upstream_order_id: &str,
    ) -> Result<RemoteStatus, GatewayError> {
        let response = self
            .http
            .get(self.status_url(upstream_order_id))
            .basic_auth(&self.config.service_id, Some(&self.config.service_secret))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: OrderStatusReply = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let block = reply.status.unwrap_or_default();

        Ok(RemoteStatus {
            raw_action: block.action,
            raw_code: block.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PayNlGateway {
        PayNlGateway::new(PayNlConfig {
            base_url: Url::parse("https://connect.pay.example/v1").unwrap(),
            service_id: "SL-1234".into(),
            service_secret: "secret".into(),
            payment_method_id: 961,
        })
    }

    #[test]
    fn status_path_percent_encodes_the_order_id() {
        let url = gateway().status_url("ord/../123 x");
        assert_eq!(
            url,
            "https://connect.pay.example/v1/orders/ord%2F..%2F123%20x/status"
        );
    }

    #[test]
    fn create_reply_contract_requires_id_and_redirect() {
        let full = r#"{"id":"X1","links":{"redirect":"https://pay/x1"}}"#;
        assert!(serde_json::from_str::<CreateOrderReply>(full).is_ok());

        let missing_redirect = r#"{"id":"X1","links":{}}"#;
        assert!(serde_json::from_str::<CreateOrderReply>(missing_redirect).is_err());

        let missing_id = r#"{"links":{"redirect":"https://pay/x1"}}"#;
        assert!(serde_json::from_str::<CreateOrderReply>(missing_id).is_err());
    }

    #[test]
    fn status_reply_tolerates_absent_fields() {
        let reply: OrderStatusReply = serde_json::from_str("{}").unwrap();
        assert!(reply.status.is_none());

        let reply: OrderStatusReply =
            serde_json::from_str(r#"{"status":{"action":"PAID"}}"#).unwrap();
        let block = reply.status.unwrap();
        assert_eq!(block.action.as_deref(), Some("PAID"));
        assert_eq!(block.code, None);
    }
}
