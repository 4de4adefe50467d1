//! Per-guild monitoring scheduler.
//!
//! Owns one recurring probe task per guild. Tasks are keyed by guild id in
//! a registry so they can be torn down individually (`stop`), replaced
//! atomically (`start` aborts any prior task before installing the new
//! one), or drained at shutdown (`stop_all`). Ticks within a guild are
//! serialized by construction: each task is a single `sleep -> probe ->
//! record` loop, so a slow probe delays the next tick instead of
//! overlapping it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::probe::Prober;
use crate::storage::{ServerStatus, Storage};

pub struct MonitorManager {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn Prober>,
    interval: Duration,
}

impl MonitorManager {
    pub fn new(storage: Arc<dyn Storage>, prober: Arc<dyn Prober>, interval: Duration) -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            storage,
            prober,
            interval,
        }
    }

    /// Starts auto-monitoring for a guild, replacing any existing task.
    ///
    /// One probe runs immediately and its snapshot is recorded before this
    /// returns, so a read issued right after `start` sees current status.
    /// The recurring task then fires every `interval` until stopped; probe
    /// failures are recorded as offline snapshots and never cancel it.
    pub async fn start(&self, guild_id: &str, host: &str, port: u16) {
        self.stop(guild_id).await;

        perform_check(&self.storage, &self.prober, guild_id, host, port).await;

        let storage = Arc::clone(&self.storage);
        let prober = Arc::clone(&self.prober);
        let interval = self.interval;
        let guild = guild_id.to_string();
        let target_host = host.to_string();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                perform_check(&storage, &prober, &guild, &target_host, port).await;
            }
        });

        // Two concurrent starts can both pass the stop above; whichever
        // inserts second must abort the survivor of the first.
        if let Some(previous) = self.tasks.lock().await.insert(guild_id.to_string(), handle) {
            previous.abort();
        }
        info!(guild_id, host, port, "started monitoring");
    }

    /// Stops auto-monitoring for a guild. A guild with no active task is
    /// not an error; calling this repeatedly is safe.
    pub async fn stop(&self, guild_id: &str) {
        if let Some(handle) = self.tasks.lock().await.remove(guild_id) {
            handle.abort();
            info!(guild_id, "stopped monitoring");
        }
    }

    /// One-shot probe-and-record outside any recurring schedule.
    pub async fn check_once(&self, guild_id: &str, host: &str, port: u16) -> ServerStatus {
        perform_check(&self.storage, &self.prober, guild_id, host, port).await
    }

    /// Restarts monitoring for every stored config with auto-monitor
    /// enabled. Called once at boot. Guilds are restored independently;
    /// an unreachable server records an offline snapshot and still gets
    /// its timer.
    pub async fn restore_all(&self) {
        let configs = self.storage.list_configs();
        let mut restored = 0usize;
        for config in configs {
            if config.auto_monitor {
                self.start(&config.guild_id, &config.host, config.port).await;
                restored += 1;
            }
        }
        if restored > 0 {
            info!(restored, "restored auto-monitoring from stored configs");
        }
    }

    /// Cancels every active task. Used at process shutdown.
    pub async fn stop_all(&self) {
        let mut tasks = self.tasks.lock().await;
        let count = tasks.len();
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
        if count > 0 {
            info!(count, "stopped all monitoring tasks");
        }
    }

    pub async fn is_monitoring(&self, guild_id: &str) -> bool {
        self.tasks.lock().await.contains_key(guild_id)
    }

    pub async fn active_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

async fn perform_check(
    storage: &Arc<dyn Storage>,
    prober: &Arc<dyn Prober>,
    guild_id: &str,
    host: &str,
    port: u16,
) -> ServerStatus {
    let outcome = prober.probe(host, port).await;
    if outcome.online {
        info!(
            guild_id,
            host,
            port,
            players = outcome.player_count,
            max = outcome.max_players,
            "probe completed: online"
        );
    } else {
        warn!(guild_id, host, port, "probe completed: offline");
    }
    storage.save_status(ServerStatus::from_outcome(guild_id, &outcome))
}
