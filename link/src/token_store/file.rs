//! File-backed token store.
//!
//! Keeps the token and a JSON snapshot of the cached profile in a small TOML
//! file with owner-only permissions (0600 on Unix).
//!
//! # File Format
//!
//! ```toml
//! token = "eyJhbGciOiJSUzI1NiIsImtpZCI6..."
//! profile_json = '{"_id":"64a1","name":"Ana","email":"ana@teste.com","role":"cliente"}'
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::TokenStore;
use crate::error::{BarberLinkError, Result};
use crate::models::Profile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_json: Option<String>,
}

/// Token store persisted to `<config_dir>/barbearia/session.toml`.
///
/// Contents are read once at construction and cached; every mutation
/// rewrites the whole file.
#[derive(Debug)]
pub struct FileTokenStore {
    file_path: PathBuf,
    cache: RwLock<SessionFile>,
}

impl FileTokenStore {
    /// Default session file path.
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("barbearia").join("session.toml")
        } else if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("barbearia").join("session.toml")
        } else {
            PathBuf::from(".barbearia").join("session.toml")
        }
    }

    /// Open the store at the default location.
    pub fn new() -> Result<Self> {
        Self::with_path(Self::default_path())
    }

    /// Open the store at `file_path`, loading any existing contents.
    pub fn with_path(file_path: PathBuf) -> Result<Self> {
        let cache = Self::load_from_disk(&file_path)?;
        Ok(Self {
            file_path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_disk(path: &Path) -> Result<SessionFile> {
        if !path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            BarberLinkError::StorageError(format!(
                "Cannot read session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            BarberLinkError::StorageError(format!(
                "Corrupted session file '{}': {}. Delete it and sign in again.",
                path.display(),
                e
            ))
        })
    }

    fn save_to_disk(&self, file: &SessionFile) -> Result<()> {
        let contents = toml::to_string_pretty(file)?;

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BarberLinkError::StorageError(format!(
                    "Failed to create session directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(&self.file_path, contents).map_err(|e| {
            BarberLinkError::StorageError(format!(
                "Failed to write session file '{}': {}",
                self.file_path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.file_path, fs::Permissions::from_mode(0o600)).map_err(
                |e| {
                    BarberLinkError::StorageError(format!(
                        "Failed to set permissions on '{}': {}",
                        self.file_path.display(),
                        e
                    ))
                },
            )?;
        }

        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut SessionFile)) -> Result<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| BarberLinkError::StorageError("session file lock poisoned".into()))?;
        let mut next = cache.clone();
        f(&mut next);
        self.save_to_disk(&next)?;
        *cache = next;
        Ok(())
    }

    fn snapshot(&self) -> Result<SessionFile> {
        self.cache
            .read()
            .map(|cache| cache.clone())
            .map_err(|_| BarberLinkError::StorageError("session file lock poisoned".into()))
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.snapshot()?.token)
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.update(|file| file.token = Some(token.to_string()))
    }

    fn cached_profile(&self) -> Result<Option<Profile>> {
        match self.snapshot()?.profile_json {
            Some(json) => match serde_json::from_str(&json) {
                Ok(profile) => Ok(Some(profile)),
                Err(e) => {
                    // A stale schema should not block sign-in
                    log::warn!("[TOKEN_STORE] Ignoring unreadable cached profile: {}", e);
                    Ok(None)
                },
            },
            None => Ok(None),
        }
    }

    fn set_cached_profile(&self, profile: &Profile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.update(|file| file.profile_json = Some(json))
    }

    fn clear(&self) -> Result<()> {
        self.update(|file| *file = SessionFile::default())
    }
}
