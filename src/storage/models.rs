use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::ProbeOutcome;

/// Monitoring target for a single guild (or the web dashboard tenant).
/// One row per guild, replaced whole on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub guild_id: String,
    pub host: String,
    pub port: u16,
    pub auto_monitor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    Online,
    Offline,
    /// Only ever produced by optimistic UI state, never by a completed probe.
    Checking,
}

/// Latest observed status for a guild's server. Overwritten in full on
/// every probe completion; absence from storage means "never checked".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub guild_id: String,
    #[serde(rename = "status")]
    pub state: ServerState,
    pub player_count: u32,
    pub max_players: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_names: Option<Vec<String>>,
    pub last_checked: DateTime<Utc>,
}

impl ServerStatus {
    /// Builds a snapshot from a probe outcome, stamped with the current time.
    pub fn from_outcome(guild_id: impl Into<String>, outcome: &ProbeOutcome) -> Self {
        Self {
            guild_id: guild_id.into(),
            state: if outcome.online {
                ServerState::Online
            } else {
                ServerState::Offline
            },
            player_count: outcome.player_count,
            max_players: outcome.max_players,
            version: outcome.version.clone(),
            motd: outcome.motd.clone(),
            player_names: outcome.player_names.clone(),
            last_checked: Utc::now(),
        }
    }
}
