// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio store: the user's collection plus the staging buffer.
//!
//! Every mutation is computed on a copy of the collection, persisted, and
//! only then committed to memory. A failed save therefore leaves the
//! in-memory state exactly as it was before the call.

use crate::client::cloud::UploadOutcome;
use crate::client::error::{PortfolioError, Result, ValidationError};
use crate::client::persistence::{Persistence, StorageMode};
use crate::client::processor::{ImageFile, ImageProcessor, ImageSettings, ProcessedImage};
use crate::models::{Photo, Portfolio, MAX_PHOTOS_PER_PORTFOLIO, MAX_PORTFOLIOS};
use chrono::Utc;

/// A file that did not make it into the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPhoto {
    pub name: String,
    pub message: String,
}

/// What happened to a batch of files offered to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddPhotosReport {
    /// Files admitted by the capacity check
    pub accepted: usize,
    /// Files beyond the capacity, never processed
    pub dropped: usize,
    /// Ids of the photos now stored
    pub added: Vec<String>,
    pub failed: Vec<FailedPhoto>,
}

/// How to settle a change rejected by the local storage quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaResolution {
    /// Recompress inline photos and retry the save.
    CompressExisting,
    /// Drop the change.
    Discard,
}

#[derive(Debug, Clone)]
struct PendingChange {
    portfolios: Vec<Portfolio>,
    clears_staging: bool,
}

pub struct PortfolioStore {
    user_id: String,
    persistence: Persistence,
    processor: ImageProcessor,
    portfolios: Vec<Portfolio>,
    temp_photos: Vec<Photo>,
    pending: Option<PendingChange>,
}

impl PortfolioStore {
    pub fn new(
        user_id: impl Into<String>,
        persistence: Persistence,
        processor: ImageProcessor,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            persistence,
            processor,
            portfolios: Vec::new(),
            temp_photos: Vec::new(),
            pending: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn mode(&self) -> StorageMode {
        self.persistence.mode()
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn portfolio(&self, portfolio_id: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == portfolio_id)
    }

    /// Photos staged for the next create or edit.
    pub fn temp_photos(&self) -> &[Photo] {
        &self.temp_photos
    }

    pub fn staging_capacity(&self) -> usize {
        MAX_PHOTOS_PER_PORTFOLIO.saturating_sub(self.temp_photos.len())
    }

    /// Whether a quota-rejected change is waiting for [`Self::resolve_quota`].
    pub fn has_pending_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the in-memory collection with the persisted one.
    ///
    /// On error the collection is left untouched.
    pub async fn load(&mut self) -> Result<usize> {
        let portfolios = self.persistence.load(&self.user_id).await?;
        tracing::info!(
            user_id = %self.user_id,
            count = portfolios.len(),
            mode = ?self.mode(),
            "Portfolios loaded"
        );
        self.portfolios = portfolios;
        Ok(self.portfolios.len())
    }

    /// Process and store files into the staging buffer.
    ///
    /// Files beyond the staging capacity are dropped before processing.
    pub async fn stage_photos<F>(
        &mut self,
        files: &[ImageFile],
        on_progress: F,
    ) -> AddPhotosReport
    where
        F: FnMut(usize, usize, &str),
    {
        let accepted = files.len().min(self.staging_capacity());
        let (photos, failed) = self.ingest(&files[..accepted], on_progress).await;

        let report = AddPhotosReport {
            accepted,
            dropped: files.len() - accepted,
            added: photos.iter().map(|p| p.id.clone()).collect(),
            failed,
        };
        self.temp_photos.extend(photos);
        report
    }

    pub fn remove_staged_photo(&mut self, photo_id: &str) {
        self.temp_photos.retain(|p| p.id != photo_id);
    }

    pub fn clear_staging(&mut self) {
        self.temp_photos.clear();
    }

    /// Create a portfolio from the staged photos.
    ///
    /// The staging buffer is cleared only once the new collection is saved.
    pub async fn create_portfolio(&mut self, title: &str, description: &str) -> Result<Portfolio> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if self.portfolios.len() >= MAX_PORTFOLIOS {
            return Err(ValidationError::PortfolioLimit.into());
        }

        let portfolio = Portfolio::new(
            title,
            description,
            self.temp_photos.clone(),
            Utc::now(),
            &self.portfolios,
        );
        let mut next = self.portfolios.clone();
        next.push(portfolio.clone());

        self.save(next, true).await?;
        tracing::info!(
            portfolio_id = %portfolio.id,
            photos = portfolio.photos.len(),
            "Portfolio created"
        );
        Ok(portfolio)
    }

    /// Add files to an existing portfolio.
    ///
    /// Exactly `min(files.len(), remaining capacity)` files are processed;
    /// the rest are dropped and counted in the report.
    pub async fn add_photos_to_portfolio<F>(
        &mut self,
        portfolio_id: &str,
        files: &[ImageFile],
        on_progress: F,
    ) -> Result<AddPhotosReport>
    where
        F: FnMut(usize, usize, &str),
    {
        let index = self.index_of(portfolio_id)?;
        let accepted = files.len().min(self.portfolios[index].remaining_capacity());
        let dropped = files.len() - accepted;
        if dropped > 0 {
            tracing::info!(portfolio_id, dropped, "Dropping files beyond portfolio capacity");
        }

        let (photos, failed) = self.ingest(&files[..accepted], on_progress).await;
        let report = AddPhotosReport {
            accepted,
            dropped,
            added: photos.iter().map(|p| p.id.clone()).collect(),
            failed,
        };
        if photos.is_empty() {
            return Ok(report);
        }

        let mut next = self.portfolios.clone();
        next[index].photos.extend(photos);
        next[index].touch(Utc::now());
        self.save(next, false).await?;
        Ok(report)
    }

    /// Remove a photo; unknown portfolio or photo ids are a no-op.
    pub async fn remove_photo(&mut self, portfolio_id: &str, photo_id: &str) -> Result<()> {
        let Some(index) = self.portfolios.iter().position(|p| p.id == portfolio_id) else {
            return Ok(());
        };
        if !self.portfolios[index].photos.iter().any(|p| p.id == photo_id) {
            return Ok(());
        }

        let mut next = self.portfolios.clone();
        next[index].photos.retain(|p| p.id != photo_id);
        next[index].touch(Utc::now());
        self.save(next, false).await
    }

    /// Delete a portfolio; absent ids are a no-op.
    pub async fn delete_portfolio(&mut self, portfolio_id: &str) -> Result<()> {
        if self.portfolio(portfolio_id).is_none() {
            return Ok(());
        }

        let next: Vec<Portfolio> = self
            .portfolios
            .iter()
            .filter(|p| p.id != portfolio_id)
            .cloned()
            .collect();

        match self
            .persistence
            .delete(&self.user_id, portfolio_id, &next)
            .await
        {
            Ok(()) => {
                tracing::info!(portfolio_id, "Portfolio deleted");
                self.portfolios = next;
                self.pending = None;
                Ok(())
            }
            Err(e) => Err(self.hold_if_over_quota(e, next, false)),
        }
    }

    /// Update a portfolio's title and description.
    pub async fn edit_portfolio(
        &mut self,
        portfolio_id: &str,
        title: &str,
        description: &str,
    ) -> Result<()> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let index = self.index_of(portfolio_id)?;

        let mut next = self.portfolios.clone();
        next[index].title = title.trim().to_string();
        next[index].description = description.trim().to_string();
        next[index].touch(Utc::now());
        self.save(next, false).await
    }

    /// Settle a change the local quota rejected.
    ///
    /// With `CompressExisting` every inline photo of the pending collection is
    /// recompressed with [`ImageSettings::compact`] and the save retried; if
    /// it still does not fit, the smaller collection stays pending.
    pub async fn resolve_quota(&mut self, resolution: QuotaResolution) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        match resolution {
            QuotaResolution::Discard => {
                tracing::info!(user_id = %self.user_id, "Discarded change rejected by quota");
                Ok(())
            }
            QuotaResolution::CompressExisting => {
                let portfolios = match self.recompress_all(&pending.portfolios) {
                    Ok(portfolios) => portfolios,
                    Err(e) => {
                        self.pending = Some(pending);
                        return Err(e);
                    }
                };
                tracing::info!(user_id = %self.user_id, "Retrying save with recompressed photos");
                self.save(portfolios, pending.clears_staging).await
            }
        }
    }

    fn recompress_all(&self, portfolios: &[Portfolio]) -> Result<Vec<Portfolio>> {
        let settings = ImageSettings::compact();
        portfolios
            .iter()
            .map(|portfolio| {
                let photos = portfolio
                    .photos
                    .iter()
                    .map(|photo| self.processor.recompress(photo, settings))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Portfolio {
                    photos,
                    ..portfolio.clone()
                })
            })
            .collect()
    }

    fn index_of(&self, portfolio_id: &str) -> Result<usize> {
        self.portfolios
            .iter()
            .position(|p| p.id == portfolio_id)
            .ok_or_else(|| ValidationError::UnknownPortfolio(portfolio_id.to_string()).into())
    }

    async fn save(&mut self, next: Vec<Portfolio>, clears_staging: bool) -> Result<()> {
        match self.persistence.save(&self.user_id, &next).await {
            Ok(()) => {
                self.portfolios = next;
                self.pending = None;
                if clears_staging {
                    self.temp_photos.clear();
                }
                Ok(())
            }
            Err(e) => Err(self.hold_if_over_quota(e, next, clears_staging)),
        }
    }

    fn hold_if_over_quota(
        &mut self,
        err: PortfolioError,
        next: Vec<Portfolio>,
        clears_staging: bool,
    ) -> PortfolioError {
        if err.is_quota_exceeded() {
            self.pending = Some(PendingChange {
                portfolios: next,
                clears_staging,
            });
        }
        tracing::error!(user_id = %self.user_id, error = %err, "Failed to persist portfolios");
        err
    }

    /// Process files, then store them through the active persistence mode.
    ///
    /// Progress totals count every file offered; files that fail processing
    /// are counted as already done.
    async fn ingest<F>(
        &self,
        files: &[ImageFile],
        mut on_progress: F,
    ) -> (Vec<Photo>, Vec<FailedPhoto>)
    where
        F: FnMut(usize, usize, &str),
    {
        let mut failed = Vec::new();
        let mut processed: Vec<ProcessedImage> = Vec::with_capacity(files.len());
        for file in files {
            match self.processor.process_for_upload(file) {
                Ok(image) => processed.push(image),
                Err(e) => {
                    tracing::warn!(name = %file.name, error = %e, "Skipping unprocessable file");
                    failed.push(FailedPhoto {
                        name: file.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let total = files.len();
        let skipped = failed.len();
        let mut photos = Vec::with_capacity(processed.len());
        for outcome in self
            .persistence
            .store_images(&processed, &self.user_id, |current, _, name| {
                on_progress(skipped + current, total, name)
            })
            .await
        {
            match outcome {
                UploadOutcome::Uploaded(photo) => photos.push(photo),
                UploadOutcome::Failed { name, message } => {
                    failed.push(FailedPhoto { name, message })
                }
            }
        }
        (photos, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local::LocalStorage;

    async fn local_store(dir: &std::path::Path) -> PortfolioStore {
        let storage = LocalStorage::open(dir, 1 << 20).await.unwrap();
        PortfolioStore::new("user_test", Persistence::Local(storage), ImageProcessor::default())
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = local_store(dir.path()).await;

        let err = store.create_portfolio("   ", "desc").await.unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Validation(ValidationError::EmptyTitle)
        ));
        assert!(store.portfolios().is_empty());
        assert!(dir.path().read_dir().unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_edit_unknown_portfolio() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = local_store(dir.path()).await;

        let err = store
            .edit_portfolio("portfolio_1", "Title", "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Validation(ValidationError::UnknownPortfolio(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_without_pending_change_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = local_store(dir.path()).await;
        store
            .resolve_quota(QuotaResolution::CompressExisting)
            .await
            .unwrap();
        assert!(!store.has_pending_change());
    }
}
