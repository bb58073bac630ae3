//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Author : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// Config Tools

use serde::{Serialize, Deserialize};
use std::{fs, path::{Path, PathBuf}};
use std::io::{self, Write};
use std::time::Duration;
use dirs::config_dir;
use thiserror::Error;
use log::{debug, warn};

use crate::history::{SortKey, DEFAULT_PAGE_SIZE};
use crate::passgen::PolicyConstraints;
use crate::textgen::DEFAULT_GENERATOR_TIMEOUT;

const APP_DIR: &str = "securepass";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config directory error: {0}")]
    ConfigDirError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_path: PathBuf,
    pub page_size: usize,
    /// Sort order `history` and `delete --index` use when `--sort` is absent.
    pub default_sort: SortKey,
    pub default_policy: PolicyConstraints,
    /// Program and arguments used by `ai`; unset disables it.
    pub text_generator: Option<Vec<String>>,
    pub generator_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let history_path = get_config_dir()
            .map(|dir| dir.join("history"))
            .unwrap_or_else(|_| PathBuf::from(APP_DIR).join("history"));
        Self {
            history_path,
            page_size: DEFAULT_PAGE_SIZE,
            default_sort: SortKey::default(),
            default_policy: PolicyConstraints::default(),
            text_generator: None,
            generator_timeout_secs: DEFAULT_GENERATOR_TIMEOUT.as_secs(),
        }
    }
}

impl AppConfig {
    /// Reads the config at `path`, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_data = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&config_data)?;
        if config.page_size == 0 {
            warn!("page_size 0 in {} replaced by {}", path.display(), DEFAULT_PAGE_SIZE);
            config.page_size = DEFAULT_PAGE_SIZE;
        }
        if config.generator_timeout_secs == 0 {
            let default_secs = DEFAULT_GENERATOR_TIMEOUT.as_secs();
            warn!("generator_timeout_secs 0 in {} replaced by {}", path.display(), default_secs);
            config.generator_timeout_secs = default_secs;
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_file = fs::File::create(path)?;
        serde_json::to_writer_pretty(config_file, &self)?;
        Ok(())
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path()?)
    }
}

/// 获取配置目录
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    match config_dir() {
        Some(path) => Ok(path.join(APP_DIR)),
        None => Err(ConfigError::ConfigDirError("Could not determine configuration directory".to_string())),
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// 提示用户输入
pub fn prompt_input(prompt: &str) -> Result<String, String> {
    print!("{}", prompt);
    io::stdout().flush().map_err(|e| e.to_string())?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(|e| e.to_string())?;
    Ok(input.trim().to_string())
}
