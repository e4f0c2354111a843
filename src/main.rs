use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrate_scheduler::config::Config;
use orchestrate_scheduler::jobs::tx_sentry::start_tx_sentry_job;
use orchestrate_scheduler::services::dispatcher::NatsDispatcher;
use orchestrate_scheduler::services::metrics::JobMetrics;
use orchestrate_scheduler::services::registry::HttpRegistry;
use orchestrate_scheduler::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,orchestrate_scheduler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Connecting to NATS at {}...", config.nats_url);
    let dispatcher = NatsDispatcher::connect(&config.nats_url)
        .await
        .expect("Failed to connect to NATS");

    let registry = Arc::new(HttpRegistry::new(
        config.chain_registry_url.clone(),
        config.registry_cache_ttl,
    ));
    let metrics = JobMetrics::register(prometheus::default_registry()).expect("Failed to register metrics");

    let state = AppState {
        db,
        dispatcher: Arc::new(dispatcher),
        chains: registry.clone(),
        accounts: registry,
        metrics,
        topics: config.topics.clone(),
        dispatch_timeout: config.dispatch_timeout,
    };

    start_tx_sentry_job(state, config.sentry_interval, config.sentry_max_retries).await;

    tracing::info!("Scheduler running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    tracing::info!("Shutting down");
}
