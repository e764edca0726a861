//! Settings file locations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "GRIDLINE_CONFIG";

pub const SETTINGS_FILE_NAME: &str = "gridline.toml";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("gridline"))
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .context("Could not determine data directory")
        .map(|p| p.join("gridline"))
}

pub fn logs_dir() -> Result<PathBuf> {
    data_dir().map(|p| p.join("logs"))
}

/// Where the settings come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Passed explicitly (command line); must exist
    Explicit(PathBuf),
    /// Named by `GRIDLINE_CONFIG`; must exist
    Environment(PathBuf),
    /// The per-user default; built-in defaults apply when it is absent
    UserDefault(PathBuf),
}

impl SettingsSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Environment(path) | Self::UserDefault(path) => path,
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Self::UserDefault(_))
    }
}

/// Resolve the settings file: explicit path, then `GRIDLINE_CONFIG`, then
/// `<config dir>/gridline/gridline.toml`
pub fn resolve_settings_path(
    explicit: Option<&Path>,
    env_value: Option<PathBuf>,
) -> Result<SettingsSource> {
    if let Some(path) = explicit {
        return Ok(SettingsSource::Explicit(path.to_path_buf()));
    }
    if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(SettingsSource::Environment(path));
    }
    config_dir().map(|dir| SettingsSource::UserDefault(dir.join(SETTINGS_FILE_NAME)))
}
