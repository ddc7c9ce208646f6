use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Relays used when `NOSTR_RELAYS` is not set.
pub const DEFAULT_RELAYS: [&str; 3] = [
    "wss://nostr.pleb.network",
    "wss://relay.damus.io",
    "wss://nostr.wine",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub nostr: NostrConfig,
    pub peach: PeachConfig,
    pub sync: SyncConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NostrConfig {
    pub private_key: String,
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeachConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub store_path: PathBuf,
    pub poll_interval_secs: u64,
    pub error_backoff_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub health_port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        // The signing key has no sane default: refuse to start without it.
        let private_key = env::var("NOSTR_PRIVATE_KEY")
            .context("NOSTR_PRIVATE_KEY must be set (nsec or hex secret key)")?;

        Ok(Config {
            nostr: NostrConfig {
                private_key,
                relays: env::var("NOSTR_RELAYS")
                    .map(|raw| parse_relay_list(&raw))
                    .unwrap_or_else(|_| DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect()),
            },
            peach: PeachConfig {
                base_url: env::var("PEACH_API_URL")
                    .unwrap_or_else(|_| "https://api.peachbitcoin.com/v1".to_string()),
            },
            sync: SyncConfig {
                store_path: env::var("OFFER_STORE_PATH")
                    .unwrap_or_else(|_| "./peach_offers_data/offers.json".to_string())
                    .into(),
                poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
                error_backoff_secs: env::var("ERROR_BACKOFF_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            monitoring: MonitoringConfig {
                health_port: env::var("HEALTH_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

fn parse_relay_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
