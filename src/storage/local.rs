use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::AppData;
use crate::storage::Storage;

pub const KEY_DEPOSIT: &str = "deposit";
pub const KEY_LEVERAGE: &str = "leverage";
pub const KEY_DAILY_TARGET: &str = "dailyTarget";
pub const KEY_INITIAL_DEPOSIT: &str = "initialDeposit";
pub const KEY_DAYS: &str = "days";
pub const KEY_ARCHIVED_DAYS: &str = "archivedDays";
pub const KEY_GOALS: &str = "goals";
pub const KEY_THEME: &str = "theme";

/// Key-value file in the shape of browser local storage: a JSON object whose
/// values are JSON documents encoded as strings.
///
/// Keys are read one by one. A missing or corrupt key falls back to its
/// default without affecting the others. Keys this type does not manage
/// (`theme`, anything unknown) survive a save untouched.
pub struct LocalStore {
    path: PathBuf,
    defaults: AppData,
}

impl LocalStore {
    pub fn new(path: impl AsRef<Path>, defaults: AppData) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            defaults,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No local store at {}, starting empty", self.path.display());
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                warn!(
                    "Local store {} is not a JSON object, using defaults",
                    self.path.display()
                );
                Ok(Map::new())
            }
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub async fn get_theme(&self) -> Result<Option<String>> {
        let map = self.read_map().await?;
        Ok(read_key::<Option<String>>(&map, KEY_THEME, None))
    }

    pub async fn set_theme(&self, theme: &str) -> Result<()> {
        let mut map = self.read_map().await?;
        put_key(&mut map, KEY_THEME, &theme)?;
        self.write_map(&map).await
    }
}

/// Decode one key. Values are normally strings holding JSON; a raw JSON
/// value is accepted too.
fn read_key<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(raw) = map.get(key) else {
        return default;
    };
    let decoded = match raw {
        Value::String(s) => serde_json::from_str::<T>(s)
            .or_else(|_| serde_json::from_value::<T>(raw.clone())),
        other => serde_json::from_value::<T>(other.clone()),
    };
    match decoded {
        Ok(v) => v,
        Err(e) => {
            warn!("Corrupt value for '{}' in local store ({}), using default", key, e);
            default
        }
    }
}

fn put_key<T: Serialize + ?Sized>(map: &mut Map<String, Value>, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_string(value)
        .with_context(|| format!("Failed to encode '{}'", key))?;
    map.insert(key.to_string(), Value::String(encoded));
    Ok(())
}

#[async_trait]
impl Storage for LocalStore {
    async fn load(&mut self) -> Result<AppData> {
        let map = self.read_map().await?;
        let d = &self.defaults;
        let data = AppData {
            deposit: read_key(&map, KEY_DEPOSIT, d.deposit),
            leverage: read_key(&map, KEY_LEVERAGE, d.leverage),
            daily_target: read_key(&map, KEY_DAILY_TARGET, d.daily_target),
            initial_deposit: read_key(&map, KEY_INITIAL_DEPOSIT, d.initial_deposit),
            days: read_key(&map, KEY_DAYS, d.days.clone()),
            archived_days: read_key(&map, KEY_ARCHIVED_DAYS, d.archived_days.clone()),
            goals: read_key(&map, KEY_GOALS, d.goals.clone()),
        };
        debug!(
            "Loaded {} days, {} archived, {} goals from {}",
            data.days.len(),
            data.archived_days.len(),
            data.goals.len(),
            self.path.display()
        );
        Ok(data)
    }

    async fn save(&mut self, data: &AppData) -> Result<()> {
        let mut map = self.read_map().await?;
        put_key(&mut map, KEY_DEPOSIT, &data.deposit)?;
        put_key(&mut map, KEY_LEVERAGE, &data.leverage)?;
        put_key(&mut map, KEY_DAILY_TARGET, &data.daily_target)?;
        put_key(&mut map, KEY_INITIAL_DEPOSIT, &data.initial_deposit)?;
        put_key(&mut map, KEY_DAYS, &data.days)?;
        put_key(&mut map, KEY_ARCHIVED_DAYS, &data.archived_days)?;
        put_key(&mut map, KEY_GOALS, &data.goals)?;
        self.write_map(&map).await
    }

    fn describe(&self) -> String {
        format!("local store {}", self.path.display())
    }
}
