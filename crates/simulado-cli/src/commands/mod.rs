//! Subcommand implementations and the setup they share.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use simulado_core::store::{FileStore, KeyValueStore};
use simulado_providers::config::{load_config_from, SimuladoConfig};

pub mod init;
pub mod list_models;
pub mod onboard;
pub mod profile;
pub mod results;
pub mod run;

/// Paths given on the command line.
pub struct Paths {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl Paths {
    pub fn load_config(&self) -> Result<SimuladoConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }
}

/// The store backing the profile and the session handoff.
pub fn open_store(config: &SimuladoConfig) -> Arc<dyn KeyValueStore> {
    tracing::debug!("data directory: {}", config.data_dir.display());
    Arc::new(FileStore::new(&config.data_dir))
}
