//! Persisted access and refresh tokens

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Where the bearer credentials live between requests
///
/// Tokens are opaque strings. Passing `None` to [`set_tokens`](Self::set_tokens)
/// leaves that slot as it was.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn set_tokens(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()>;

    /// Forget both tokens
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "auth_token", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    fn apply(&mut self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(token) = access {
            self.access_token = Some(token.to_string());
        }
        if let Some(token) = refresh {
            self.refresh_token = Some(token.to_string());
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

fn lock(tokens: &Mutex<StoredTokens>) -> MutexGuard<'_, StoredTokens> {
    // A panic mid-update leaves plain strings behind, still usable
    tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tokens held for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            tokens: Mutex::new(StoredTokens {
                access_token: Some(access.into()),
                refresh_token: refresh,
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        lock(&self.tokens).access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.tokens).refresh_token.clone()
    }

    fn set_tokens(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()> {
        lock(&self.tokens).apply(access, refresh);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.tokens) = StoredTokens::default();
        Ok(())
    }
}

/// Tokens persisted as a small JSON file
///
/// The file is rewritten on every change and removed by [`clear`](TokenStore::clear).
/// A missing file means no tokens.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Open the store, loading whatever the file currently holds
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let tokens = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                StoredTokens::default()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    ApiError::token_store(format!(
                        "Failed to parse token file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            StoredTokens::default()
        };

        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        if tokens.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, json).map_err(|e| {
            ApiError::token_store(format!(
                "Failed to write token file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        lock(&self.tokens).access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.tokens).refresh_token.clone()
    }

    /// Memory only changes once the file has been written
    fn set_tokens(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()> {
        let mut tokens = lock(&self.tokens);
        let mut updated = tokens.clone();
        updated.apply(access, refresh);
        self.persist(&updated)?;
        *tokens = updated;
        Ok(())
    }

    /// Memory is cleared even when removing the file fails
    fn clear(&self) -> Result<()> {
        let mut tokens = lock(&self.tokens);
        *tokens = StoredTokens::default();
        self.persist(&tokens)
    }
}
