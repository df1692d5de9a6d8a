//! Durable bearer-token storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token is the only client-side state that survives a restart. Both the
//! HTTP client (to attach it) and the session store (to persist, restore and
//! clear it) go through a shared `TokenStore`, so they always agree on which
//! token is current.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Storage key (browser) and file name (native) holding the token.
pub const TOKEN_KEY: &str = "cbx_token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("browser storage unavailable")]
    Unavailable,
}

/// Key-value persistence for the opaque bearer token.
///
/// Implementations never inspect the token. Clearing an absent token is not
/// an error.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// In-process token store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already stored, as if left by a previous run.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// File-backed token store holding nothing but the token text.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), %error, "unreadable token file");
                }
                return None;
            }
        };
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_owned())
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        std::fs::write(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

/// Browser `localStorage` token store under [`TOKEN_KEY`].
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageTokenStore;

#[cfg(feature = "hydrate")]
impl LocalStorageTokenStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().unwrap_or(None))
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(feature = "hydrate")]
impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        Self::storage()
            .ok()?
            .get_item(TOKEN_KEY)
            .unwrap_or(None)
            .filter(|token| !token.is_empty())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(TOKEN_KEY, token)
            .map_err(|_| StorageError::Unavailable)
    }

    fn clear(&self) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(TOKEN_KEY)
            .map_err(|_| StorageError::Unavailable)
    }
}
