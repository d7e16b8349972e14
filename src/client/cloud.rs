// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio API client.
//!
//! Handles:
//! - Image uploads (single and sequential batch with progress)
//! - Loading, replacing and deleting a user's portfolio collection
//! - Connectivity probing
//!
//! No caching or retries: a network failure surfaces immediately.

use crate::client::error::{PortfolioError, Result};
use crate::client::processor::{next_photo_id, ImageFile};
use crate::error::ErrorResponse;
use crate::models::{Photo, Portfolio, PortfolioMetadata};
use crate::routes::portfolios::{
    DeletePortfolioResponse, PortfoliosResponse, SavePortfoliosResponse,
};
use crate::routes::upload::UploadResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Result of one file in a batch upload.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Uploaded(Photo),
    Failed { name: String, message: String },
}

impl UploadOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, UploadOutcome::Failed { .. })
    }

    pub fn photo(&self) -> Option<&Photo> {
        match self {
            UploadOutcome::Uploaded(photo) => Some(photo),
            UploadOutcome::Failed { .. } => None,
        }
    }
}

/// Acknowledgement of a full-collection save.
#[derive(Debug, Clone)]
pub struct SaveAck {
    pub saved: u32,
    pub metadata: PortfolioMetadata,
}

/// Acknowledgement of a single-portfolio delete.
#[derive(Debug, Clone, Copy)]
pub struct DeleteAck {
    pub deleted: bool,
    pub remaining: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    user_id: &'a str,
    portfolios: &'a [Portfolio],
}

/// Portfolio API client.
#[derive(Clone)]
pub struct CloudStorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl CloudStorageClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one file for a user.
    pub async fn upload_image(&self, file: &ImageFile, user_id: &str) -> Result<Photo> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| PortfolioError::Upload(format!("invalid MIME type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("userId", user_id.to_string());

        let response = self
            .http
            .post(format!("{}/api/upload-image", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = check_response_json(response)
            .await
            .map_err(|e| match e {
                PortfolioError::Network(msg) => PortfolioError::Upload(msg),
                other => other,
            })?;

        tracing::debug!(name = %file.name, url = %upload.url, "Image uploaded");

        Ok(Photo {
            id: next_photo_id(),
            src: upload.url,
            name: file.name.clone(),
            size: upload.size,
            mime_type: file.mime_type.clone(),
            dimensions: None,
            compressed_size: None,
            original_type: None,
            uploaded_at: chrono::DateTime::parse_from_rfc3339(&upload.uploaded_at)
                .ok()
                .map(|d| d.with_timezone(&chrono::Utc)),
        })
    }

    /// Upload files one at a time.
    ///
    /// `on_progress(current, total, name)` fires before each attempt and once
    /// more with `current == total` when the batch is done. A failed file is
    /// recorded and the batch continues.
    pub async fn upload_images<F>(
        &self,
        files: &[ImageFile],
        user_id: &str,
        mut on_progress: F,
    ) -> Vec<UploadOutcome>
    where
        F: FnMut(usize, usize, &str),
    {
        let total = files.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, file) in files.iter().enumerate() {
            on_progress(index, total, &file.name);
            match self.upload_image(file, user_id).await {
                Ok(photo) => outcomes.push(UploadOutcome::Uploaded(photo)),
                Err(e) => {
                    tracing::warn!(
                        name = %file.name,
                        error = %e,
                        "Upload failed, continuing batch"
                    );
                    outcomes.push(UploadOutcome::Failed {
                        name: file.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        on_progress(total, total, "");
        outcomes
    }

    /// Replace the user's stored collection.
    pub async fn save_portfolios(
        &self,
        portfolios: &[Portfolio],
        user_id: &str,
    ) -> Result<SaveAck> {
        let response = self
            .http
            .post(format!("{}/api/portfolios", self.base_url))
            .json(&SaveRequest {
                user_id,
                portfolios,
            })
            .send()
            .await?;

        let body: SavePortfoliosResponse = check_response_json(response).await?;
        Ok(SaveAck {
            saved: body.saved,
            metadata: body.metadata,
        })
    }

    /// Load the user's stored collection.
    pub async fn load_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let response = self
            .http
            .get(format!("{}/api/portfolios", self.base_url))
            .query(&[("userId", user_id)])
            .send()
            .await?;

        let body: PortfoliosResponse = check_response_json(response).await?;
        Ok(body.portfolios)
    }

    /// Remove one portfolio from the user's stored collection.
    pub async fn delete_portfolio(&self, portfolio_id: &str, user_id: &str) -> Result<DeleteAck> {
        let response = self
            .http
            .delete(format!("{}/api/portfolios", self.base_url))
            .query(&[("userId", user_id), ("portfolioId", portfolio_id)])
            .send()
            .await?;

        let body: DeletePortfolioResponse = check_response_json(response).await?;
        Ok(DeleteAck {
            deleted: body.deleted,
            remaining: body.remaining,
        })
    }

    /// Best-effort reachability probe.
    pub async fn test_connection(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::info!(error = %e, base_url = %self.base_url, "Portfolio API unreachable");
                false
            }
        }
    }
}

/// Check response status and parse the JSON body.
///
/// Non-success responses become `Network` errors carrying the server's
/// message; callers re-tag them where a more specific class applies.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => err.details.unwrap_or(err.error),
            Err(_) if body.is_empty() => status.to_string(),
            Err(_) => body,
        };
        return Err(PortfolioError::Network(format!("HTTP {}: {}", status, message)));
    }

    response
        .json()
        .await
        .map_err(|e| PortfolioError::Network(format!("Invalid response body: {}", e)))
}
