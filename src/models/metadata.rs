// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user collection metadata, rewritten on every save.

use crate::models::Portfolio;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Summary of a user's stored collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PortfolioMetadata {
    pub portfolio_count: u32,
    pub total_photos: u32,
    pub last_updated: DateTime<Utc>,
}

impl PortfolioMetadata {
    pub fn from_portfolios(portfolios: &[Portfolio], now: DateTime<Utc>) -> Self {
        Self {
            portfolio_count: portfolios.len() as u32,
            total_photos: portfolios.iter().map(|p| p.photos.len() as u32).sum(),
            last_updated: now,
        }
    }
}

/// Stored view counter for one public portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewCounter {
    pub count: u64,
}
