//! Config - TOML 設定
//!
//! ```toml
//! storage_dir = "/var/lib/workmint"
//! storage_key = "workmint.task_drafts"
//! sync_interval_secs = 30
//! start_online = true
//! ```
//!
//! 全項目に既定値があり、ファイルが無ければ既定値だけで動きます。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::SyncLoopConfig;
use crate::app::sync_loop::DEFAULT_SYNC_INTERVAL;
use crate::domain::ConfigError;
use crate::store::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkmintConfig {
    /// Directory holding the draft blob.
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub sync_interval_secs: u64,
    /// Initial connectivity flag for the CLI.
    pub start_online: bool,
}

impl Default for WorkmintConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL.as_secs(),
            start_online: true,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("workmint");
    path
}

impl WorkmintConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Self::from_toml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn sync_loop_config(&self) -> SyncLoopConfig {
        SyncLoopConfig {
            interval: self.sync_interval(),
        }
    }
}
