//! Individual command implementations. Each one validates its input,
//! calls into storage/the scheduler, and renders a text reply.

use std::time::Duration;

use crate::monitor::MonitorManager;
use crate::storage::{ServerConfig, ServerState, ServerStatus, Storage};

use super::{CheckMode, CommandReply};

/// Discord caps embed field values at 1024 characters; long player lists
/// and MOTDs are clamped to fit.
const FIELD_LIMIT: usize = 1024;

fn clamp(text: String) -> String {
    if text.chars().count() <= FIELD_LIMIT {
        return text;
    }
    let mut clamped: String = text.chars().take(FIELD_LIMIT - 3).collect();
    clamped.push_str("...");
    clamped
}

fn no_config_reply() -> CommandReply {
    CommandReply::ephemeral("No server configured! Use `/setup` to configure your server first.")
}

pub(super) async fn setup(
    storage: &dyn Storage,
    guild_id: &str,
    host: String,
    port: u16,
) -> CommandReply {
    let host = host.trim().to_string();
    if host.is_empty() {
        return CommandReply::ephemeral("Invalid configuration: server host is required.");
    }
    if port == 0 {
        return CommandReply::ephemeral("Invalid configuration: port must be between 1 and 65535.");
    }

    // Re-running setup resets the monitoring flag, matching a fresh config.
    let config = storage.save_config(ServerConfig {
        guild_id: guild_id.to_string(),
        host,
        port,
        auto_monitor: false,
    });

    CommandReply::public(format!(
        "✅ Server configured: `{}:{}`\nUse `/check-server` to check its status.",
        config.host, config.port
    ))
}

pub(super) async fn check_server(
    storage: &dyn Storage,
    monitor: &MonitorManager,
    guild_id: &str,
    mode: CheckMode,
) -> CommandReply {
    let Some(config) = storage.get_config(guild_id) else {
        return no_config_reply();
    };

    match mode {
        CheckMode::Once => {
            let status = monitor.check_once(guild_id, &config.host, config.port).await;
            CommandReply::public(render_check(&config, &status))
        }
        CheckMode::Always => {
            monitor.start(guild_id, &config.host, config.port).await;
            storage.save_config(ServerConfig {
                auto_monitor: true,
                ..config.clone()
            });
            CommandReply::public(format!(
                "🔄 Auto-monitoring started\nI'll check **{}:{}** every {} and report player counts.",
                config.host,
                config.port,
                format_interval(monitor.interval())
            ))
        }
    }
}

pub(super) async fn stop_monitoring(
    storage: &dyn Storage,
    monitor: &MonitorManager,
    guild_id: &str,
) -> CommandReply {
    let Some(config) = storage.get_config(guild_id) else {
        return no_config_reply();
    };

    if !config.auto_monitor {
        return CommandReply::ephemeral("Auto-monitoring is not currently active.");
    }

    monitor.stop(guild_id).await;
    storage.save_config(ServerConfig {
        auto_monitor: false,
        ..config.clone()
    });

    CommandReply::public(format!(
        "⏸️ Monitoring stopped\nAuto-monitoring has been disabled for **{}:{}**.",
        config.host, config.port
    ))
}

pub(super) fn ip(storage: &dyn Storage, guild_id: &str) -> CommandReply {
    let Some(config) = storage.get_config(guild_id) else {
        return no_config_reply();
    };
    CommandReply::public(format!(
        "📡 Server address: `{}:{}`",
        config.host, config.port
    ))
}

pub(super) fn player_list(storage: &dyn Storage, guild_id: &str) -> CommandReply {
    let Some(config) = storage.get_config(guild_id) else {
        return no_config_reply();
    };
    let status = storage.get_status(guild_id);
    let Some(status) = status.filter(|s| s.state == ServerState::Online) else {
        return CommandReply::ephemeral(
            "Server is offline or hasn't been checked yet. Use `/check-server` first.",
        );
    };

    let mut lines = vec![
        format!("👥 Online Players — `{}:{}`", config.host, config.port),
        format!("Player count: {}/{}", status.player_count, status.max_players),
    ];

    match status.player_names.as_deref() {
        Some(names) if !names.is_empty() => {
            let list = names
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{}. {name}", i + 1))
                .collect::<Vec<_>>()
                .join("\n");
            lines.push(clamp(list));
        }
        _ if status.player_count == 0 => {
            lines.push("No players currently online".to_string());
        }
        _ => {
            lines.push(format!(
                "{} player(s) online (names not available)",
                status.player_count
            ));
        }
    }

    lines.push(format!("Last checked: {}", format_timestamp(&status)));
    CommandReply::public(lines.join("\n"))
}

pub(super) fn server_info(storage: &dyn Storage, guild_id: &str) -> CommandReply {
    let Some(config) = storage.get_config(guild_id) else {
        return no_config_reply();
    };

    let mut lines = vec![
        format!("📊 Server Information — **{}:{}**", config.host, config.port),
        format!(
            "Auto-monitoring: {}",
            if config.auto_monitor {
                "✅ Enabled"
            } else {
                "❌ Disabled"
            }
        ),
    ];

    match storage.get_status(guild_id) {
        Some(status) => {
            let (emoji, label) = match status.state {
                ServerState::Online => ("🟢", "Online"),
                ServerState::Offline => ("🔴", "Offline"),
                ServerState::Checking => ("🟡", "Checking"),
            };
            lines.push(format!("Status: {emoji} {label}"));
            if status.state == ServerState::Online {
                lines.push(format!(
                    "Players: {}/{}",
                    status.player_count, status.max_players
                ));
                if let Some(version) = &status.version {
                    lines.push(format!("Version: {version}"));
                }
                if let Some(motd) = &status.motd {
                    lines.push(format!("MOTD: {}", clamp(motd.clone())));
                }
            }
            lines.push(format!("Last checked: {}", format_timestamp(&status)));
        }
        None => {
            lines.push(
                "Not checked yet. Use `/check-server` to check the server status.".to_string(),
            );
        }
    }

    CommandReply::public(lines.join("\n"))
}

pub(super) fn help() -> CommandReply {
    CommandReply::public(
        "📖 Available commands:\n\
         `/setup ip:<host> port:<port>` — configure your Minecraft server for monitoring\n\
         `/ip` — display the configured server address\n\
         `/check-server mode:<once|always>` — check status once or start auto-monitoring\n\
         `/stop-monitoring` — stop automatic monitoring\n\
         `/player-list` — show the list of currently online players\n\
         `/server-info` — display detailed server information\n\
         `/help` — show this message"
            .to_string(),
    )
}

fn render_check(config: &ServerConfig, status: &ServerStatus) -> String {
    let mut lines = vec![
        if status.state == ServerState::Online {
            "🟢 Server Online".to_string()
        } else {
            "🔴 Server Offline".to_string()
        },
        format!("IP: `{}:{}`", config.host, config.port),
    ];

    if status.state == ServerState::Online {
        lines.push(format!(
            "Players: {}/{}",
            status.player_count, status.max_players
        ));
        if let Some(version) = &status.version {
            lines.push(format!("Version: {version}"));
        }
        if let Some(names) = status.player_names.as_deref() {
            if !names.is_empty() {
                lines.push(format!("Online players: {}", clamp(names.join(", "))));
            }
        }
    }

    lines.push(format!("Last checked: {}", format_timestamp(status)));
    lines.join("\n")
}

fn format_timestamp(status: &ServerStatus) -> String {
    status.last_checked.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else {
        format!("{secs} seconds")
    }
}
