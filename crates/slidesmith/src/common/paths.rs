//! Path Utilities
//!
//! Resolution of the per-user slidesmith directory.

use std::path::PathBuf;

use super::error::Error;

/// Get the slidesmith base directory (`~/.slidesmith/`)
pub fn slidesmith_dir() -> Result<PathBuf, Error> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".slidesmith"))
}

/// Get the default configuration file (`~/.slidesmith/config.json`)
pub fn default_config_path() -> Result<PathBuf, Error> {
    Ok(slidesmith_dir()?.join("config.json"))
}
