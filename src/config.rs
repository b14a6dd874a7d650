// CLI configuration file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "taskdeck.yaml";
const CONFIG_ENV_VAR: &str = "TASKDECK_CONFIG";

/// Which key-value backend the CLI persists through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    File,
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "file" => Ok(Backend::File),
            other => Err(Error::Validation(format!(
                "unknown backend: {other} (expected sqlite or file)"
            ))),
        }
    }
}

/// Optional config file. A missing file means defaults; an unreadable or
/// invalid one is an error the CLI reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub backend: Option<Backend>,
}

/// Config file location: env override first, then the platform config
/// directory. `None` when neither is available.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|dir| dir.join("taskdeck").join(CONFIG_FILE_NAME))
}

pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) => load_from_path(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|err| {
        Error::Validation(format!("invalid config {}: {}", path.display(), err))
    })
}

/// Data directory when neither the CLI nor the config names one.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("taskdeck")
}
