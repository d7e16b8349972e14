// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Photo Portfolio: upload photos, group them into portfolios, share them.
//!
//! This crate provides the backend API that stores portfolio collections
//! and uploaded images, plus the client core ([`client`]) that keeps a
//! user's portfolios in sync with that API or with local storage.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::BlobStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub blobs: BlobStore,
}
