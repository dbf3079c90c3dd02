use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;

use crate::difficulty::Difficulty;
use crate::error::{LaboonError, Result};

pub const CONFIG_ENV: &str = "LABOON_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "laboon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mining: MiningConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningConfig {
    pub difficulty: Difficulty,
    pub parallel: bool,
    pub show_attempts: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `$LABOON_CONFIG` if set (the file must exist), otherwise
    /// `laboon.toml` when present, otherwise the defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(&PathBuf::from(path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            LaboonError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| LaboonError::ConfigError(format!("无效的日志级别: {}", self.logging.level)))
    }
}
