// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client core: keeps a user's portfolios in sync with the API or with
//! local storage when the API is unreachable.

pub mod cloud;
pub mod error;
pub mod identity;
pub mod local;
pub mod persistence;
pub mod processor;
pub mod store;
pub mod sync;

pub use cloud::{CloudStorageClient, DeleteAck, SaveAck, UploadOutcome};
pub use error::{PortfolioError, ValidationError};
pub use identity::{
    ExternalUser, IdentityProvider, IdentitySource, NoIdentityProvider, SessionIdentity,
    StaticIdentityProvider,
};
pub use local::LocalStorage;
pub use persistence::{Persistence, StorageMode};
pub use processor::{ImageFile, ImageProcessor, ImageSettings};
pub use store::{AddPhotosReport, FailedPhoto, PortfolioStore, QuotaResolution};
pub use sync::{InitOutcome, SyncOrchestrator, SyncState};
