// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio and photo models shared by the API and the client core.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Maximum number of portfolios a single user may own.
pub const MAX_PORTFOLIOS: usize = 10;

/// Maximum number of photos in a single portfolio.
pub const MAX_PHOTOS_PER_PORTFOLIO: usize = 10;

/// Longest accepted user or portfolio identifier.
pub const MAX_ID_LEN: usize = 128;

/// A named, ordered collection of photos owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Portfolio {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Build a new portfolio whose id is derived from its creation time.
    ///
    /// `existing` is consulted so that two portfolios created within the same
    /// millisecond still get distinct ids.
    pub fn new(
        title: &str,
        description: &str,
        photos: Vec<Photo>,
        now: DateTime<Utc>,
        existing: &[Portfolio],
    ) -> Self {
        Self {
            id: next_portfolio_id(now, existing),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            photos,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`, keeping it strictly increasing.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }

    /// Number of photos that can still be added.
    pub fn remaining_capacity(&self) -> usize {
        MAX_PHOTOS_PER_PORTFOLIO.saturating_sub(self.photos.len())
    }

    /// First photo with a remote (http/https) source, used for previews.
    pub fn cover_url(&self) -> Option<&str> {
        self.photos
            .iter()
            .map(|p| p.src.as_str())
            .find(|src| src.starts_with("https://") || src.starts_with("http://"))
    }
}

/// A single photo inside a portfolio or the staging buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Photo {
    pub id: String,
    /// Inline `data:` URL or a remote URL returned by the upload endpoint
    pub src: String,
    pub name: String,
    /// Original size in bytes
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub size: u64,
    /// MIME type of `src`
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Size in bytes after re-encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub compressed_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Photo {
    /// Whether the photo is stored inline as a data URL.
    pub fn is_inline(&self) -> bool {
        self.src.starts_with("data:")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Derive a portfolio id from the creation time, bumping on collision.
pub fn next_portfolio_id(now: DateTime<Utc>, existing: &[Portfolio]) -> String {
    let taken: HashSet<&str> = existing.iter().map(|p| p.id.as_str()).collect();
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("portfolio_{}", millis);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        millis += 1;
    }
}

/// Check that an identifier is safe to use as a storage key.
///
/// Identifiers become Firestore document ids, local file names and upload
/// directory names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Reasons a portfolio collection violates the storage ceilings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("too many portfolios: {count} (max {max})", max = MAX_PORTFOLIOS)]
    TooManyPortfolios { count: usize },

    #[error("portfolio {id} has {count} photos (max {max})", max = MAX_PHOTOS_PER_PORTFOLIO)]
    TooManyPhotos { id: String, count: usize },

    #[error("duplicate portfolio id: {0}")]
    DuplicateId(String),

    #[error("invalid portfolio id: {0:?}")]
    InvalidId(String),
}

/// Validate the collection-level invariants.
pub fn check_collection(portfolios: &[Portfolio]) -> Result<(), CollectionError> {
    if portfolios.len() > MAX_PORTFOLIOS {
        return Err(CollectionError::TooManyPortfolios {
            count: portfolios.len(),
        });
    }

    let mut seen = HashSet::new();
    for portfolio in portfolios {
        if !is_valid_id(&portfolio.id) {
            return Err(CollectionError::InvalidId(portfolio.id.clone()));
        }
        if !seen.insert(portfolio.id.as_str()) {
            return Err(CollectionError::DuplicateId(portfolio.id.clone()));
        }
        if portfolio.photos.len() > MAX_PHOTOS_PER_PORTFOLIO {
            return Err(CollectionError::TooManyPhotos {
                id: portfolio.id.clone(),
                count: portfolio.photos.len(),
            });
        }
    }
    Ok(())
}
