use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Cadence of recurring probes. Defaults to 2 minutes.
    pub monitor_interval: Duration,
    /// Deadline for one Server List Ping exchange. Defaults to 5 seconds.
    pub probe_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| format!("invalid BIND_ADDR: {e}"))?;

        let monitor_interval = duration_from_env("MONITOR_INTERVAL_SECS", 120)?;
        let probe_timeout = duration_from_env("PROBE_TIMEOUT_SECS", 5)?;

        Ok(AppConfig {
            bind_addr,
            monitor_interval,
            probe_timeout,
        })
    }
}

fn duration_from_env(key: &str, default_secs: u64) -> Result<Duration, String> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
