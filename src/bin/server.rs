use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use craftwatch::config::AppConfig;
use craftwatch::monitor::MonitorManager;
use craftwatch::probe::MinecraftProber;
use craftwatch::storage::{MemStorage, Storage};
use craftwatch::web::create_axum_router;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Arc::new(AppConfig::from_env()?);
    let storage: Arc<dyn Storage> = Arc::new(MemStorage::new());
    let prober = Arc::new(MinecraftProber::new(config.probe_timeout));
    let monitor = Arc::new(MonitorManager::new(
        storage.clone(),
        prober,
        config.monitor_interval,
    ));

    // Bring timers back in line with whatever configuration survived.
    // With the in-memory store this is a no-op after a fresh start; a
    // durable Storage impl makes it meaningful.
    monitor.restore_all().await;

    let app = create_axum_router(storage, monitor.clone(), config.clone());
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "craftwatch listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(monitor))
        .await?;

    Ok(())
}

async fn shutdown_signal(monitor: Arc<MonitorManager>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, stopping monitors");
    monitor.stop_all().await;
}
