use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_OUT_DIR: &str = "Generated";
pub const DEFAULT_DB_PATH: &str = "Data/image_database.db";
pub const DEFAULT_WIDTH: u32 = 250;
pub const DEFAULT_HEIGHT: u32 = 200;
pub const DEFAULT_INTERVAL_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunCfg {
    pub out_dir: PathBuf,
    pub db_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub interval_ms: u64,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Stop after this many saved images; `None` runs until told to quit.
    pub max_images: Option<u64>,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            interval_ms: DEFAULT_INTERVAL_MS,
            seed: None,
            max_images: None,
        }
    }
}

impl RunCfg {
    pub fn from_yaml(txt: &str) -> Result<Self, ConfigError> {
        let cfg: RunCfg = serde_yaml::from_str(txt)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let txt = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml(&txt)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be at least 1".into()));
        }
        if self.out_dir.as_os_str().is_empty() || self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("out_dir and db_path must be set".into()));
        }
        Ok(())
    }
}
