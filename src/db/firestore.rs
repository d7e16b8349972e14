// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Portfolios (one document per user holding the whole collection)
//! - Metadata (collection summary per user)
//! - Views (per-portfolio view counters)

use crate::db::{collections, keys};
use crate::error::AppError;
use crate::models::{Portfolio, PortfolioMetadata, ViewCounter};
use serde::{Deserialize, Serialize};

/// Stored portfolio collection document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PortfolioCollection {
    user_id: String,
    portfolios: Vec<Portfolio>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Portfolio Operations ────────────────────────────────────

    /// Get a user's portfolio collection.
    pub async fn get_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>, AppError> {
        let doc: Option<PortfolioCollection> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PORTFOLIOS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(|d| d.portfolios).unwrap_or_default())
    }

    /// Replace a user's portfolio collection and its metadata atomically.
    pub async fn set_portfolios(
        &self,
        user_id: &str,
        portfolios: &[Portfolio],
        metadata: &PortfolioMetadata,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let doc = PortfolioCollection {
            user_id: user_id.to_string(),
            portfolios: portfolios.to_vec(),
        };

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::PORTFOLIOS)
            .document_id(user_id)
            .object(&doc)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add portfolios to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::METADATA)
            .document_id(user_id)
            .object(metadata)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add metadata to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            user_id,
            count = portfolios.len(),
            "Portfolio collection stored"
        );
        Ok(())
    }

    /// Get the collection summary for a user.
    pub async fn get_metadata(
        &self,
        user_id: &str,
    ) -> Result<Option<PortfolioMetadata>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::METADATA)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── View Counters ───────────────────────────────────────────

    /// Increment a portfolio's view counter.
    ///
    /// Read-modify-write: concurrent views may undercount, which is acceptable
    /// for a display-only statistic.
    pub async fn increment_views(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<u64, AppError> {
        let client = self.get_client()?;
        let doc_id = keys::view_doc_id(user_id, portfolio_id);

        let current: Option<ViewCounter> = client
            .fluent()
            .select()
            .by_id_in(collections::VIEWS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut counter = current.unwrap_or_default();
        counter.count += 1;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::VIEWS)
            .document_id(&doc_id)
            .object(&counter)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(counter.count)
    }
}
