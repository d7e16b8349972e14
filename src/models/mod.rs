// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod metadata;
pub mod portfolio;

pub use metadata::{PortfolioMetadata, ViewCounter};
pub use portfolio::{
    check_collection, is_valid_id, CollectionError, Dimensions, Photo, Portfolio,
    MAX_PHOTOS_PER_PORTFOLIO, MAX_PORTFOLIOS,
};
