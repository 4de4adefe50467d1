//! Chat command layer.
//!
//! Transport-agnostic dispatch for the bot surface: the gateway (Discord
//! or otherwise) parses an interaction into a [`BotCommand`], hands it to
//! [`CommandContext::dispatch`] together with the guild id, and sends the
//! rendered [`CommandReply`] back. Input validation happens here so the
//! scheduler never sees an invalid host or port.

use std::sync::Arc;

use crate::monitor::MonitorManager;
use crate::storage::Storage;

mod commands;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Single probe-and-record.
    Once,
    /// Start the recurring monitor.
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Setup { host: String, port: u16 },
    CheckServer { mode: CheckMode },
    StopMonitoring,
    Ip,
    PlayerList,
    ServerInfo,
    Help,
}

/// Rendered command response. `ephemeral` mirrors the Discord notion of a
/// reply only the invoking user sees; error and usage replies are
/// ephemeral, status reports are public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    pub ephemeral: bool,
}

impl CommandReply {
    fn public(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

pub struct CommandContext {
    storage: Arc<dyn Storage>,
    monitor: Arc<MonitorManager>,
}

impl CommandContext {
    pub fn new(storage: Arc<dyn Storage>, monitor: Arc<MonitorManager>) -> Self {
        Self { storage, monitor }
    }

    /// Executes one command for a guild. `guild_id` is `None` when the
    /// command arrived outside a guild (e.g. a DM), which every command
    /// rejects.
    pub async fn dispatch(&self, guild_id: Option<&str>, command: BotCommand) -> CommandReply {
        let Some(guild_id) = guild_id else {
            return CommandReply::ephemeral("This command can only be used in a server!");
        };

        match command {
            BotCommand::Setup { host, port } => {
                commands::setup(&*self.storage, guild_id, host, port).await
            }
            BotCommand::CheckServer { mode } => {
                commands::check_server(&*self.storage, &self.monitor, guild_id, mode).await
            }
            BotCommand::StopMonitoring => {
                commands::stop_monitoring(&*self.storage, &self.monitor, guild_id).await
            }
            BotCommand::Ip => commands::ip(&*self.storage, guild_id),
            BotCommand::PlayerList => commands::player_list(&*self.storage, guild_id),
            BotCommand::ServerInfo => commands::server_info(&*self.storage, guild_id),
            BotCommand::Help => commands::help(),
        }
    }
}
