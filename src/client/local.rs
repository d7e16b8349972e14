// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed local key-value storage with a byte quota.
//!
//! Each key is one file under the storage directory. Writes that would push
//! the directory past its quota fail with `QuotaExceeded` and leave the
//! previous value in place.

use crate::client::error::{PortfolioError, Result};
use crate::models::{is_valid_id, Portfolio};
use std::path::{Path, PathBuf};

/// Canonical key of the persisted session identity.
pub const SESSION_KEY: &str = "session_user_id";

const FILE_EXTENSION: &str = "json";

/// Key of a user's portfolio collection.
pub fn portfolios_key(user_id: &str) -> String {
    format!("portfolios_{}", user_id)
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
    quota_bytes: u64,
}

impl LocalStorage {
    /// Open (creating if needed) the storage directory.
    pub async fn open(dir: impl Into<PathBuf>, quota_bytes: u64) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortfolioError::Storage(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir, quota_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_id(key) {
            return Err(PortfolioError::Storage(format!("invalid key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortfolioError::Storage(format!("{}: {}", path.display(), e))),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let current = file_len(&path).await?;
        let needed = self
            .used_bytes()
            .await?
            .saturating_sub(current)
            .saturating_add(value.len() as u64);

        if needed > self.quota_bytes {
            tracing::warn!(key, needed, quota = self.quota_bytes, "Local storage quota exceeded");
            return Err(PortfolioError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        // Write-then-rename so a crash never leaves a truncated value.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| PortfolioError::Storage(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PortfolioError::Storage(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortfolioError::Storage(format!("{}: {}", path.display(), e))),
        }
    }

    /// Total bytes of all stored values.
    pub async fn used_bytes(&self) -> Result<u64> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| PortfolioError::Storage(format!("{}: {}", self.dir.display(), e)))?;
        let mut total = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PortfolioError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
                total += file_len(&path).await?;
            }
        }
        Ok(total)
    }

    /// Load a user's collection; a missing entry is an empty collection.
    pub async fn load_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        match self.get(&portfolios_key(user_id)).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                PortfolioError::Storage(format!("corrupt portfolio data for {}: {}", user_id, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save_portfolios(&self, user_id: &str, portfolios: &[Portfolio]) -> Result<()> {
        let raw = serde_json::to_string(portfolios)
            .map_err(|e| PortfolioError::Storage(e.to_string()))?;
        self.set(&portfolios_key(user_id), &raw).await
    }
}

async fn file_len(path: &Path) -> Result<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(PortfolioError::Storage(format!("{}: {}", path.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path(), 1024).await.unwrap();

        assert_eq!(storage.get(SESSION_KEY).await.unwrap(), None);
        storage.set(SESSION_KEY, "user_abc").await.unwrap();
        assert_eq!(
            storage.get(SESSION_KEY).await.unwrap().as_deref(),
            Some("user_abc")
        );

        storage.remove(SESSION_KEY).await.unwrap();
        storage.remove(SESSION_KEY).await.unwrap();
        assert_eq!(storage.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota_counts_replaced_value_once() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path(), 10).await.unwrap();

        storage.set("a", "12345678").await.unwrap();
        // Replacing the same key frees its old bytes first.
        storage.set("a", "abcdefghij").await.unwrap();

        let err = storage.set("b", "x").await.unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::QuotaExceeded {
                needed: 11,
                quota: 10
            }
        ));
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("abcdefghij"));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path(), 1024).await.unwrap();
        assert!(matches!(
            storage.set("../escape", "x").await,
            Err(PortfolioError::Storage(_))
        ));
    }
}
