// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod blob;
pub mod share;

pub use blob::{BlobStore, StoredBlob};
