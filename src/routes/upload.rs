// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image upload route (multipart).

use crate::error::{AppError, Result};
use crate::routes::portfolios::require_id;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Room for the multipart envelope and the `userId` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload-image", post(upload_image))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub size: u64,
    pub uploaded_at: String,
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    data: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// Store one image for a user and return its public URL.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<UploadedFile> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    data,
                });
            }
            Some("userId") => {
                user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let user_id = require_id("userId", user_id.as_deref())?;
    let file = file.ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;

    if file.data.is_empty() {
        return Err(AppError::BadRequest("file is empty".to_string()));
    }
    if file.data.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "file exceeds {} bytes",
            state.config.max_upload_bytes
        )));
    }
    if let Some(content_type) = &file.content_type {
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "unsupported content type: {}",
                content_type
            )));
        }
    }

    let format = image::guess_format(&file.data)
        .map_err(|_| AppError::BadRequest(format!("{} is not a recognized image", file.name)))?;
    let extension = format.extensions_str().first().copied().unwrap_or("img");

    let blob = state.blobs.put(user_id, &file.data, extension).await?;

    tracing::info!(
        user_id,
        name = %file.name,
        filename = %blob.filename,
        size = blob.size,
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        url: blob.url,
        filename: blob.filename,
        size: blob.size,
        uploaded_at: format_utc_rfc3339(blob.uploaded_at),
    }))
}
