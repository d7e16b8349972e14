// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore or in-memory key-value).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{Portfolio, PortfolioMetadata};

/// Collection names as constants.
pub mod collections {
    /// Portfolio arrays, keyed by user id
    pub const PORTFOLIOS: &str = "portfolios";
    /// Collection summaries, keyed by user id
    pub const METADATA: &str = "metadata";
    /// View counters, keyed by `{user_id}:{portfolio_id}`
    pub const VIEWS: &str = "views";
}

/// Flat key layout used by key-value backends.
pub mod keys {
    use super::collections;

    pub fn portfolios(user_id: &str) -> String {
        format!("{}:{}", collections::PORTFOLIOS, user_id)
    }

    pub fn metadata(user_id: &str) -> String {
        format!("{}:{}", collections::METADATA, user_id)
    }

    /// Document id of a view counter inside the `views` collection.
    pub fn view_doc_id(user_id: &str, portfolio_id: &str) -> String {
        format!("{}:{}", user_id, portfolio_id)
    }

    pub fn views(user_id: &str, portfolio_id: &str) -> String {
        format!(
            "{}:{}",
            collections::VIEWS,
            view_doc_id(user_id, portfolio_id)
        )
    }
}

/// Storage handle shared by all request handlers.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to the backend selected in the configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Firestore => {
                Ok(Self::Firestore(FirestoreDb::new(&config.gcp_project_id).await?))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::Memory(MemoryDb::new()))
            }
        }
    }

    /// Load a user's portfolio collection (empty if none stored).
    pub async fn get_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, AppError> {
        match self {
            Self::Firestore(db) => db.get_portfolios(user_id).await,
            Self::Memory(db) => db.get_portfolios(user_id),
        }
    }

    /// Replace a user's collection and rewrite its metadata.
    pub async fn set_portfolios(
        &self,
        user_id: &str,
        portfolios: &[Portfolio],
    ) -> Result<PortfolioMetadata, AppError> {
        let metadata = PortfolioMetadata::from_portfolios(portfolios, chrono::Utc::now());
        match self {
            Self::Firestore(db) => db.set_portfolios(user_id, portfolios, &metadata).await?,
            Self::Memory(db) => db.set_portfolios(user_id, portfolios, &metadata)?,
        }
        Ok(metadata)
    }

    pub async fn get_metadata(
        &self,
        user_id: &str,
    ) -> Result<Option<PortfolioMetadata>, AppError> {
        match self {
            Self::Firestore(db) => db.get_metadata(user_id).await,
            Self::Memory(db) => db.get_metadata(user_id),
        }
    }

    /// Increment and return the view count of a public portfolio.
    pub async fn increment_views(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<u64, AppError> {
        match self {
            Self::Firestore(db) => db.increment_views(user_id, portfolio_id).await,
            Self::Memory(db) => Ok(db.increment_views(user_id, portfolio_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(keys::portfolios("u1"), "portfolios:u1");
        assert_eq!(keys::metadata("u1"), "metadata:u1");
        assert_eq!(keys::views("u1", "p1"), "views:u1:p1");
    }
}
