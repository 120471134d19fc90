//! TOML file configuration structures.
//!
//! These structs directly map to the `oplk-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Whole-request deadline enforced by the HTTP layer, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Payment gateway configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the provider's Orders API.
    #[serde(default = "default_gateway_base_url")]
    pub base_url: Url,
    /// Service id, doubles as the basic-auth username.
    pub service_id: String,
    /// Basic-auth password. If absent, `PAYNL_SERVICE_SECRET` from the
    /// environment is used instead.
    #[serde(default)]
    pub service_secret: Option<String>,
    /// Provider payment method id (961 = iDEAL paylink).
    #[serde(default = "default_payment_method_id")]
    pub payment_method_id: u32,
    /// Deadline for a single gateway call, in seconds.
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
    /// The single currency this deployment charges in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_gateway_base_url() -> Url {
    Url::parse("https://connect.pay.nl/v1").expect("valid default base url")
}

fn default_payment_method_id() -> u32 {
    961
}

fn default_gateway_timeout_secs() -> u64 {
    10
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Admin API configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token for the operator endpoints. When unset, the admin API
    /// rejects every request.
    #[serde(default)]
    pub token: Option<String>,
}

/// Order store configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

/// Which Order Store implementation backs the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Per-process map; state does not survive a restart.
    #[default]
    Memory,
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
}
