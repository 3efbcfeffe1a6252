//! Token Store
//!
//! The token artifact is a single JSON file in the `authorized_user` layout.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash never leaves a half-written token behind.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Credential;
use crate::common::{AppResult, Error};

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted credential.
    ///
    /// `Ok(None)` when there is no artifact; an error when it exists but
    /// cannot be read or parsed.
    pub fn load(&self) -> AppResult<Option<Credential>> {
        if !self.path.exists() {
            debug!("No token artifact at {:?}", self.path);
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)?;
        let credential: Credential = serde_json::from_str(&data)?;
        Ok(Some(credential))
    }

    /// Persist (create or replace) the credential.
    pub fn save(&self, credential: &Credential) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(credential)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::Io(e)
        })?;

        info!("Saved token to {:?}", self.path);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}
