//! Server status probing.
//!
//! The [`Prober`] trait is the boundary the scheduler and the request
//! surfaces depend on: a probe never fails, it only reports an offline
//! target. [`MinecraftProber`] speaks the Server List Ping protocol.

use async_trait::async_trait;

mod minecraft;

pub use minecraft::MinecraftProber;

/// Normalized result of one status query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub online: bool,
    pub player_count: u32,
    pub max_players: u32,
    pub version: Option<String>,
    pub motd: Option<String>,
    pub player_names: Option<Vec<String>>,
}

impl ProbeOutcome {
    /// The outcome every failure mode collapses to: unreachable, zero counts.
    pub fn offline() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Queries one server. Network and protocol failures (timeout, refused
    /// connection, unresolved host, malformed response) are normalized to
    /// an offline outcome rather than surfaced to the caller.
    async fn probe(&self, host: &str, port: u16) -> ProbeOutcome;
}
