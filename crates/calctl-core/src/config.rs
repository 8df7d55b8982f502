//! Where the event store lives.

use std::path::{Path, PathBuf};

use crate::error::{CalError, Result};

/// Environment variable that overrides the default store location.
pub const DATA_PATH_ENV: &str = "CALCTL_DATA_PATH";

const DEFAULT_DIR: &str = ".calctl";
const DEFAULT_FILE: &str = "events.json";

/// Store configuration, passed explicitly into [`crate::store::EventStore::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
}

impl Config {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Resolve the store path: `explicit` first, then `$CALCTL_DATA_PATH`,
    /// then `~/.calctl/events.json`.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        match std::env::var_os(DATA_PATH_ENV) {
            Some(path) if !path.is_empty() => Ok(Self::new(path)),
            _ => Ok(Self::new(default_data_path()?)),
        }
    }

    /// Sibling file holding the exclusive lock for the store.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .data_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILE.into());
        name.push(".lock");
        self.data_path.with_file_name(name)
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

pub fn default_data_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CalError::Storage("could not determine home directory".to_string()))?;
    Ok(home.join(DEFAULT_DIR).join(DEFAULT_FILE))
}
