use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "FLEET_KM_VIEWER_CONFIG";

/// User settings. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Per-photo HTTP timeout.
    pub photo_timeout_secs: u64,
    /// Cards per row in the photo gallery.
    pub gallery_columns: usize,
    /// Imported files kept in memory (0 disables memoization).
    pub import_cache_entries: usize,
    /// Where exports are offered by default; current directory when unset.
    pub export_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            photo_timeout_secs: 10,
            gallery_columns: 3,
            import_cache_entries: 8,
            export_dir: None,
        }
    }
}

impl ViewerConfig {
    /// Load from `$FLEET_KM_VIEWER_CONFIG` or the per-user config file.
    /// A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => Self::config_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ViewerConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.sanitized())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home
            .join(".config")
            .join("fleet-km-viewer")
            .join("config.json"))
    }

    pub fn photo_timeout(&self) -> Duration {
        Duration::from_secs(self.photo_timeout_secs)
    }

    fn sanitized(mut self) -> Self {
        self.gallery_columns = self.gallery_columns.max(1);
        if self.photo_timeout_secs == 0 {
            self.photo_timeout_secs = Self::default().photo_timeout_secs;
        }
        self
    }
}
