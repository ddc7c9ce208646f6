use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use peach_nostr_bridge::api::PeachClient;
use peach_nostr_bridge::core::{logging, Config, HealthChecker};
use peach_nostr_bridge::nostr::NostrPublisher;
use peach_nostr_bridge::sync::{OfferStore, SyncEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    logging::init_logging(&config.monitoring.log_level);

    tracing::info!("🍑 Peach → Nostr bridge starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Relays: {}", config.nostr.relays.join(", "));

    // Initialize health checker
    let health_checker = Arc::new(HealthChecker::new());

    // Start health check endpoint
    let health_clone = health_checker.clone();
    let health_port = config.monitoring.health_port;
    tokio::spawn(async move { start_health_server(health_clone, health_port).await });

    tracing::info!("✅ Health endpoint running on port {}", health_port);

    // Connect the Nostr relay pool before the first cycle
    let publisher =
        NostrPublisher::connect(&config.nostr.private_key, &config.nostr.relays).await?;
    health_checker.update_component("relay_pool", true).await;

    let source = PeachClient::new(config.peach.base_url.clone());
    let store = OfferStore::new(config.sync.store_path.clone());

    // A corrupt store fails here, before any publish is attempted
    let engine = SyncEngine::new(
        source,
        publisher,
        store,
        Duration::from_secs(config.sync.poll_interval_secs),
        Duration::from_secs(config.sync.error_backoff_secs),
    )?
    .with_health_checker(health_checker.clone());

    engine.run().await;

    Ok(())
}

async fn start_health_server(health_checker: Arc<HealthChecker>, port: u16) {
    use warp::Filter;

    let health = warp::path("health")
        .and(warp::any().map(move || health_checker.clone()))
        .and_then(|checker: Arc<HealthChecker>| async move {
            let status = checker.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });

    warp::serve(health).run(([0, 0, 0, 0], port)).await;
}
