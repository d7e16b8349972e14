// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process key-value store for local development and tests.
//!
//! Values are kept as JSON so the stored shape matches what a remote
//! key-value service would hold.

use crate::db::keys;
use crate::error::AppError;
use crate::models::{Portfolio, PortfolioMetadata};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryDb {
    entries: Arc<DashMap<String, serde_json::Value>>,
    views: Arc<DashMap<String, u64>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.entries
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| AppError::Database(e.to_string()))
            })
            .transpose()
    }

    fn set<T: Serialize>(&self, key: String, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value).map_err(|e| AppError::Database(e.to_string()))?;
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, AppError> {
        Ok(self
            .get(&keys::portfolios(user_id))?
            .unwrap_or_default())
    }

    pub fn set_portfolios(
        &self,
        user_id: &str,
        portfolios: &[Portfolio],
        metadata: &PortfolioMetadata,
    ) -> Result<(), AppError> {
        self.set(keys::portfolios(user_id), &portfolios)?;
        self.set(keys::metadata(user_id), metadata)
    }

    pub fn get_metadata(&self, user_id: &str) -> Result<Option<PortfolioMetadata>, AppError> {
        self.get(&keys::metadata(user_id))
    }

    pub fn increment_views(&self, user_id: &str, portfolio_id: &str) -> u64 {
        let mut count = self
            .views
            .entry(keys::views(user_id, portfolio_id))
            .or_insert(0);
        *count += 1;
        *count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_portfolios_round_trip() {
        let db = MemoryDb::new();
        assert!(db.get_portfolios("u1").unwrap().is_empty());

        let portfolio = Portfolio::new("Street", "", vec![], Utc::now(), &[]);
        let portfolios = vec![portfolio];
        let metadata = PortfolioMetadata::from_portfolios(&portfolios, Utc::now());
        db.set_portfolios("u1", &portfolios, &metadata).unwrap();

        assert_eq!(db.get_portfolios("u1").unwrap(), portfolios);
        assert_eq!(db.get_metadata("u1").unwrap().unwrap().portfolio_count, 1);
        assert!(db.get_portfolios("u2").unwrap().is_empty());
    }

    #[test]
    fn test_view_counter_is_per_portfolio() {
        let db = MemoryDb::new();
        assert_eq!(db.increment_views("u1", "p1"), 1);
        assert_eq!(db.increment_views("u1", "p1"), 2);
        assert_eq!(db.increment_views("u1", "p2"), 1);
    }
}
