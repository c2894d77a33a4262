use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::app_data::{DEFAULT_DAILY_TARGET, DEFAULT_DEPOSIT, DEFAULT_LEVERAGE};
use crate::models::AppData;

/// Where the tracker keeps its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Key-value file on this machine.
    Local,
    /// The persistence server at `api_url`.
    Remote,
}

impl StorageKind {
    pub fn from_str_loose(s: &str) -> Option<StorageKind> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Some(StorageKind::Local),
            "remote" | "http" | "server" => Some(StorageKind::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Local => write!(f, "local"),
            StorageKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Persistence server
    pub server_addr: String,
    pub data_file: String,

    // Client storage
    pub storage: StorageKind,
    pub local_store_file: String,
    pub api_url: String,

    // Settings used when nothing has been stored yet
    pub default_deposit: f64,
    pub default_leverage: f64,
    pub default_daily_target: f64,

    // Currency rates (empty url disables polling)
    pub rates_url: String,
    pub rates_base: String,
    pub rates_poll_secs: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            server_addr: env("SERVER_ADDR", "0.0.0.0:3001"),
            data_file: env("DATA_FILE", "data/data.json"),
            storage: StorageKind::from_str_loose(&env("STORAGE", "local"))
                .unwrap_or(StorageKind::Local),
            local_store_file: env("LOCAL_STORE_FILE", "data/local_store.json"),
            api_url: env("API_URL", "http://localhost:3001")
                .trim_end_matches('/')
                .to_string(),
            default_deposit: env("DEFAULT_DEPOSIT", "30")
                .parse()
                .unwrap_or(DEFAULT_DEPOSIT),
            default_leverage: env("DEFAULT_LEVERAGE", "10")
                .parse()
                .unwrap_or(DEFAULT_LEVERAGE),
            default_daily_target: env("DEFAULT_DAILY_TARGET", "3")
                .parse()
                .unwrap_or(DEFAULT_DAILY_TARGET),
            rates_url: env("RATES_URL", ""),
            rates_base: env("RATES_BASE", "USD").to_uppercase(),
            rates_poll_secs: env("RATES_POLL_SECS", "3600").parse().unwrap_or(3600),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    /// The empty state a fresh install starts from.
    pub fn default_data(&self) -> AppData {
        AppData::with_settings(
            self.default_deposit,
            self.default_leverage,
            self.default_daily_target,
        )
    }

    pub fn rates_enabled(&self) -> bool {
        !self.rates_url.trim().is_empty()
    }
}
