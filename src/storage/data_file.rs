use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::AppData;

/// The persistence server's single JSON file. Holds whatever the client
/// last posted; nothing is validated.
pub struct DataFile {
    path: PathBuf,
    defaults: AppData,
}

impl DataFile {
    pub fn new(path: impl AsRef<Path>, defaults: AppData) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            defaults,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored blob, or the defaults when nothing has been saved yet.
    /// Unreadable or unparsable contents are an error.
    pub async fn read(&self) -> Result<Value> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, serving defaults", self.path.display());
                Ok(serde_json::to_value(&self.defaults)?)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    pub async fn write(&self, value: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
