//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/reconscan)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/reconscan)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the process-wide paths, discovering them on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::discover()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "reconscan", "reconscan")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the scans storage directory.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }
}

/// Defaults applied when the command line leaves a value unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port specification; empty selects the built-in common ports.
    pub default_ports: String,
    /// Simultaneously active probes.
    pub default_concurrency: usize,
    /// Connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Per-read banner timeout in milliseconds.
    pub banner_timeout_ms: u64,
    /// Grab banners on open ports.
    pub grab_banners: bool,
    /// Connection attempts per second, 0 for unlimited.
    pub default_rate_limit: u32,
    /// Save every completed scan to the history.
    pub auto_save_scans: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: String::new(),
            default_concurrency: 100,
            default_timeout_ms: 1000,
            banner_timeout_ms: 2000,
            grab_banners: true,
            default_rate_limit: 0,
            auto_save_scans: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location; a missing file means defaults.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the scanner cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_concurrency == 0 {
            return Err(ConfigError::InvalidFormat(
                "default_concurrency must be at least 1".to_string(),
            ));
        }
        if self.default_timeout_ms == 0 || self.banner_timeout_ms == 0 {
            return Err(ConfigError::InvalidFormat(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }
}
