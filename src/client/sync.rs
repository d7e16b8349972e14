// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session startup: identity, connectivity probe, storage mode, first load.
//!
//! The storage mode is decided once per session. A failed probe selects the
//! local fallback and nothing re-probes afterwards.

use crate::client::cloud::CloudStorageClient;
use crate::client::error::{PortfolioError, Result};
use crate::client::identity::{resolve_identity, IdentityProvider, SessionIdentity};
use crate::client::local::LocalStorage;
use crate::client::persistence::{Persistence, StorageMode};
use crate::client::processor::ImageProcessor;
use crate::client::store::PortfolioStore;
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Probing,
    CloudBacked,
    LocalFallback,
    Ready,
}

/// Result of [`SyncOrchestrator::initialize`].
///
/// A failed initial load does not fail initialization: the store starts
/// empty and the error is reported here.
#[derive(Debug)]
pub struct InitOutcome {
    pub identity: SessionIdentity,
    pub mode: StorageMode,
    pub load: Result<usize>,
}

pub struct SyncOrchestrator<P> {
    config: ClientConfig,
    provider: P,
    processor: ImageProcessor,
    state: SyncState,
    identity: Option<SessionIdentity>,
    store: Option<PortfolioStore>,
}

impl<P: IdentityProvider> SyncOrchestrator<P> {
    pub fn new(config: ClientConfig, provider: P) -> Self {
        Self {
            config,
            provider,
            processor: ImageProcessor::default(),
            state: SyncState::Uninitialized,
            identity: None,
            store: None,
        }
    }

    pub fn with_processor(mut self, processor: ImageProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn mode(&self) -> Option<StorageMode> {
        self.store.as_ref().map(PortfolioStore::mode)
    }

    pub fn store(&self) -> Option<&PortfolioStore> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut PortfolioStore> {
        self.store.as_mut()
    }

    /// Resolve identity, pick the storage mode and load the collection.
    ///
    /// Calling this again after a successful start only reloads; the storage
    /// mode chosen the first time is kept.
    pub async fn initialize(&mut self) -> Result<InitOutcome> {
        if let Some(mode) = self.mode() {
            let identity = self.identity.clone().ok_or(PortfolioError::NotInitialized)?;
            let load = self.load_user_portfolios().await;
            return Ok(InitOutcome {
                identity,
                mode,
                load,
            });
        }

        let local = LocalStorage::open(&self.config.data_dir, self.config.local_quota_bytes).await?;
        let identity =
            resolve_identity(&self.provider, &local, self.config.identity_timeout).await?;
        tracing::info!(
            user_id = %identity.user_id,
            source = ?identity.source,
            "Session identity resolved"
        );

        self.state = SyncState::Probing;
        let cloud = CloudStorageClient::new(&self.config.api_url);
        let persistence = if cloud.test_connection().await {
            self.state = SyncState::CloudBacked;
            Persistence::Cloud(cloud)
        } else {
            tracing::warn!(
                api_url = %cloud.base_url(),
                "Portfolio API unreachable, using local storage for this session"
            );
            self.state = SyncState::LocalFallback;
            Persistence::Local(local)
        };
        let mode = persistence.mode();

        let mut store = PortfolioStore::new(
            identity.user_id.clone(),
            persistence,
            self.processor.clone(),
        );
        let load = store.load().await;
        if let Err(e) = &load {
            tracing::error!(error = %e, "Initial portfolio load failed, starting empty");
        }

        self.identity = Some(identity.clone());
        self.store = Some(store);
        self.state = SyncState::Ready;

        Ok(InitOutcome {
            identity,
            mode,
            load,
        })
    }

    /// Reload the collection through the mode chosen at startup.
    pub async fn load_user_portfolios(&mut self) -> Result<usize> {
        let store = self.store.as_mut().ok_or(PortfolioError::NotInitialized)?;
        store.load().await
    }
}
