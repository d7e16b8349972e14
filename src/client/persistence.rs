// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence target chosen for a session: the cloud API or local storage.

use crate::client::cloud::{CloudStorageClient, UploadOutcome};
use crate::client::error::Result;
use crate::client::local::LocalStorage;
use crate::client::processor::{ImageFile, ProcessedImage};
use crate::models::{Photo, Portfolio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Cloud,
    LocalFallback,
}

/// Where a session's portfolios and photos are persisted.
#[derive(Clone)]
pub enum Persistence {
    Cloud(CloudStorageClient),
    Local(LocalStorage),
}

impl Persistence {
    pub fn mode(&self) -> StorageMode {
        match self {
            Persistence::Cloud(_) => StorageMode::Cloud,
            Persistence::Local(_) => StorageMode::LocalFallback,
        }
    }

    pub async fn load(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        match self {
            Persistence::Cloud(client) => client.load_portfolios(user_id).await,
            Persistence::Local(storage) => storage.load_portfolios(user_id).await,
        }
    }

    /// Replace the whole stored collection.
    pub async fn save(&self, user_id: &str, portfolios: &[Portfolio]) -> Result<()> {
        match self {
            Persistence::Cloud(client) => {
                client.save_portfolios(portfolios, user_id).await?;
                Ok(())
            }
            Persistence::Local(storage) => storage.save_portfolios(user_id, portfolios).await,
        }
    }

    /// Remove one portfolio; `remaining` is the collection without it.
    pub async fn delete(
        &self,
        user_id: &str,
        portfolio_id: &str,
        remaining: &[Portfolio],
    ) -> Result<()> {
        match self {
            Persistence::Cloud(client) => {
                client.delete_portfolio(portfolio_id, user_id).await?;
                Ok(())
            }
            Persistence::Local(storage) => storage.save_portfolios(user_id, remaining).await,
        }
    }

    /// Store processed images, reporting progress per file.
    ///
    /// The cloud target uploads sequentially; the local target inlines the
    /// JPEG as a data URL. Outcomes are returned in input order.
    pub async fn store_images<F>(
        &self,
        images: &[ProcessedImage],
        user_id: &str,
        mut on_progress: F,
    ) -> Vec<UploadOutcome>
    where
        F: FnMut(usize, usize, &str),
    {
        match self {
            Persistence::Cloud(client) => {
                let files: Vec<ImageFile> = images.iter().map(|i| i.file.clone()).collect();
                client
                    .upload_images(&files, user_id, on_progress)
                    .await
                    .into_iter()
                    .zip(images)
                    .map(|(outcome, image)| match outcome {
                        UploadOutcome::Uploaded(uploaded) => {
                            UploadOutcome::Uploaded(with_remote_src(image, uploaded))
                        }
                        failed => failed,
                    })
                    .collect()
            }
            Persistence::Local(_) => {
                let total = images.len();
                let outcomes = images
                    .iter()
                    .enumerate()
                    .map(|(index, image)| {
                        on_progress(index, total, &image.file.name);
                        UploadOutcome::Uploaded(image.to_inline_photo())
                    })
                    .collect();
                on_progress(total, total, "");
                outcomes
            }
        }
    }
}

/// Keep the processing metadata, take the remote location from the upload.
fn with_remote_src(image: &ProcessedImage, uploaded: Photo) -> Photo {
    Photo {
        uploaded_at: uploaded.uploaded_at,
        ..image.to_photo(uploaded.src)
    }
}
