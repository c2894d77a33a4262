pub mod data_file;
pub mod local;
pub mod remote;
pub mod transfer;

pub use data_file::DataFile;
pub use local::LocalStore;
pub use remote::RemoteStore;
pub use transfer::{export_file_name, export_json, parse_import, ImportMode};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, StorageKind};
use crate::models::AppData;

/// Where the tracker's state lives between runs. Implementations hand back
/// defaults for anything missing; only I/O failures are errors.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load(&mut self) -> Result<AppData>;
    async fn save(&mut self, data: &AppData) -> Result<()>;
    fn describe(&self) -> String;
}

pub fn from_config(cfg: &Config) -> Box<dyn Storage> {
    match cfg.storage {
        StorageKind::Local => Box::new(LocalStore::new(&cfg.local_store_file, cfg.default_data())),
        StorageKind::Remote => Box::new(RemoteStore::new(&cfg.api_url)),
    }
}
