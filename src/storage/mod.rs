//! In-memory storage for guild configurations and status snapshots.

use dashmap::DashMap;

mod models;

pub use models::{ServerConfig, ServerState, ServerStatus};

/// Storage contract shared by every read path (chat commands, HTTP routes)
/// and the monitoring scheduler. All operations are whole-value reads and
/// writes keyed by guild id; a durable backend can be substituted without
/// touching callers.
pub trait Storage: Send + Sync {
    fn get_config(&self, guild_id: &str) -> Option<ServerConfig>;
    fn save_config(&self, config: ServerConfig) -> ServerConfig;
    fn list_configs(&self) -> Vec<ServerConfig>;
    fn delete_config(&self, guild_id: &str) -> bool;
    fn get_status(&self, guild_id: &str) -> Option<ServerStatus>;
    fn save_status(&self, status: ServerStatus) -> ServerStatus;
}

/// Volatile process-lifetime storage over concurrent maps. Entries are
/// never evicted; a restart loses everything.
#[derive(Debug, Default)]
pub struct MemStorage {
    configs: DashMap<String, ServerConfig>,
    statuses: DashMap<String, ServerStatus>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemStorage {
    fn get_config(&self, guild_id: &str) -> Option<ServerConfig> {
        self.configs.get(guild_id).map(|entry| entry.value().clone())
    }

    fn save_config(&self, config: ServerConfig) -> ServerConfig {
        self.configs.insert(config.guild_id.clone(), config.clone());
        config
    }

    fn list_configs(&self) -> Vec<ServerConfig> {
        self.configs.iter().map(|entry| entry.value().clone()).collect()
    }

    fn delete_config(&self, guild_id: &str) -> bool {
        self.configs.remove(guild_id).is_some()
    }

    fn get_status(&self, guild_id: &str) -> Option<ServerStatus> {
        self.statuses.get(guild_id).map(|entry| entry.value().clone())
    }

    fn save_status(&self, status: ServerStatus) -> ServerStatus {
        self.statuses.insert(status.guild_id.clone(), status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;

    fn config(guild_id: &str) -> ServerConfig {
        ServerConfig {
            guild_id: guild_id.to_string(),
            host: "play.example.net".to_string(),
            port: 25565,
            auto_monitor: false,
        }
    }

    #[test]
    fn config_round_trips() {
        let storage = MemStorage::new();
        let saved = storage.save_config(config("guild-1"));
        assert_eq!(storage.get_config("guild-1"), Some(saved));
    }

    #[test]
    fn save_config_is_last_write_wins() {
        let storage = MemStorage::new();
        storage.save_config(config("guild-1"));
        let mut updated = config("guild-1");
        updated.host = "mc.other.net".to_string();
        updated.auto_monitor = true;
        storage.save_config(updated.clone());

        assert_eq!(storage.get_config("guild-1"), Some(updated));
        assert_eq!(storage.list_configs().len(), 1);
    }

    #[test]
    fn delete_config_reports_presence() {
        let storage = MemStorage::new();
        storage.save_config(config("guild-1"));
        assert!(storage.delete_config("guild-1"));
        assert!(!storage.delete_config("guild-1"));
        assert!(storage.get_config("guild-1").is_none());
    }

    #[test]
    fn status_is_replaced_whole() {
        let storage = MemStorage::new();
        let online = ProbeOutcome {
            online: true,
            player_count: 5,
            max_players: 20,
            version: Some("1.21".to_string()),
            motd: Some("welcome".to_string()),
            player_names: None,
        };
        storage.save_status(ServerStatus::from_outcome("guild-1", &online));
        storage.save_status(ServerStatus::from_outcome("guild-1", &ProbeOutcome::offline()));

        let latest = storage.get_status("guild-1").unwrap();
        assert_eq!(latest.state, ServerState::Offline);
        // No fields survive from the previous snapshot.
        assert!(latest.version.is_none());
        assert!(latest.motd.is_none());
    }

    #[test]
    fn missing_guild_reads_as_none() {
        let storage = MemStorage::new();
        assert!(storage.get_config("nope").is_none());
        assert!(storage.get_status("nope").is_none());
    }
}
