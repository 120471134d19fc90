//! Open Paylink Server
//!
//! A payment order ledger fronting a payment-service-provider Orders API:
//! create paylink orders, ingest webhook notifications, serve status polls.

use clap::Parser;
use oplk_core::gateway::{PayNlConfig, PayNlGateway, PaymentGateway};
use oplk_core::ledger::OrderLedger;
use oplk_core::store::{MemoryOrderStore, OrderStore, PgOrderStore};
use oplk_server::config::{ConfigLoader, StoreBackend, get_database_url};
use oplk_server::server::{build_router, run_server};
use oplk_server::state::AppState;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Open Paylink - payment order ledger and gateway front
#[derive(Parser, Debug)]
#[command(name = "oplk-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./oplk-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting oplk-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Select the order store backend
    let mut pg_pool: Option<PgPool> = None;
    let store: Arc<dyn OrderStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory order store");
            Arc::new(MemoryOrderStore::new())
        }
        StoreBackend::Postgres => {
            let database_url = get_database_url().map_err(|e| {
                tracing::error!("DATABASE_URL environment variable not set");
                e
            })?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&database_url)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    e
                })?;
            tracing::info!("Database connection established");

            if args.migrate {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("../migrations").run(&pool).await.map_err(|e| {
                    tracing::error!("Failed to run migrations: {}", e);
                    e
                })?;
                tracing::info!("Migrations completed successfully");
            }

            pg_pool = Some(pool.clone());
            Arc::new(PgOrderStore::new(pool))
        }
    };

    // Build the gateway client
    let service_secret = config
        .gateway
        .service_secret
        .clone()
        .unwrap_or_default();
    let gateway: Arc<dyn PaymentGateway> = Arc::new(PayNlGateway::new(PayNlConfig {
        base_url: config.gateway.base_url.clone(),
        service_id: config.gateway.service_id.clone(),
        service_secret,
        payment_method_id: config.gateway.payment_method_id,
    }));

    // Assemble the ledger and application state
    let ledger = Arc::new(OrderLedger::new(
        store,
        gateway,
        Duration::from_secs(config.gateway.timeout_secs),
    ));
    let state = AppState::new(ledger, &config.gateway.currency, config.admin.token.as_deref());

    // Build the router
    let router = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // Run the server
    tracing::info!("Starting HTTP server on {}", config.server.listen);
    let result = run_server(router, config.server.listen).await;

    // Close database connections gracefully
    if let Some(pool) = pg_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
