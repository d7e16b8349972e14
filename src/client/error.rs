// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side error types.

use crate::models::MAX_PORTFOLIOS;

/// Bad user input, rejected before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Portfolio title is required")]
    EmptyTitle,

    #[error("You can create at most {max} portfolios", max = MAX_PORTFOLIOS)]
    PortfolioLimit,

    #[error("Portfolio not found: {0}")]
    UnknownPortfolio(String),
}

/// Errors surfaced by the client core.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Image processing failed: {0}")]
    Processing(String),

    #[error("Local storage quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Session not initialized")]
    NotInitialized,
}

impl PortfolioError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, PortfolioError::QuotaExceeded { .. })
    }
}

impl From<reqwest::Error> for PortfolioError {
    fn from(err: reqwest::Error) -> Self {
        PortfolioError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
