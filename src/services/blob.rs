// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filesystem blob store for uploaded images.
//!
//! Blobs are content-addressed per user (`{user_id}/{sha256-prefix}.{ext}`)
//! and served back under `/uploads/`.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// URL prefix under which stored blobs are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Hex characters of the content hash kept in the file name.
const HASH_PREFIX_LEN: usize = 24;

/// A stored blob.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Path relative to the blob root, `/`-separated
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    /// Create the store, making sure the root directory exists.
    pub async fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", root.display(), e))
        })?;
        tracing::info!(path = %root.display(), "Blob store ready");

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an image for a user. `user_id` must already be validated.
    pub async fn put(
        &self,
        user_id: &str,
        bytes: &[u8],
        extension: &str,
    ) -> Result<StoredBlob, AppError> {
        let digest = hex::encode(Sha256::digest(bytes));
        let filename = format!(
            "{}/{}.{}",
            user_id,
            &digest[..HASH_PREFIX_LEN],
            extension
        );

        let dir = self.root.join(user_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = self.root.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(user_id, filename = %filename, size = bytes.len(), "Blob stored");

        Ok(StoredBlob {
            url: format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, filename),
            filename,
            size: bytes.len() as u64,
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path(), "https://api.example.com/")
            .await
            .unwrap();

        let first = store.put("user_1", b"same bytes", "jpg").await.unwrap();
        let second = store.put("user_1", b"same bytes", "jpg").await.unwrap();

        assert_eq!(first.filename, second.filename);
        assert!(first.filename.starts_with("user_1/"));
        assert!(first
            .url
            .starts_with("https://api.example.com/uploads/user_1/"));
        assert_eq!(
            tokio::fs::read(dir.path().join(&first.filename)).await.unwrap(),
            b"same bytes"
        );
    }
}
