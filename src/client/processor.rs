// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image processing: bounded resize and JPEG re-encode.
//!
//! Every stored photo goes through here before it is uploaded or inlined,
//! so portfolios never carry full-resolution originals.

use crate::client::error::{PortfolioError, Result};
use crate::models::{Dimensions, Photo};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

pub const JPEG_MIME: &str = "image/jpeg";
const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

static PHOTO_SEQ: AtomicU64 = AtomicU64::new(0);

/// A file selected by the user, not yet processed.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the content.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PortfolioError::Processing(format!("{}: {}", path.display(), e)))?;
        let mime_type = image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(name, mime_type, bytes))
    }
}

/// Resize bounds and JPEG quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSettings {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality in `0.0..=1.0`
    pub quality: f32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 800,
            quality: 0.8,
        }
    }
}

impl ImageSettings {
    /// Tighter settings used to reclaim local storage space.
    pub fn compact() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            quality: 0.6,
        }
    }

    fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

/// Output of processing, before it is turned into a stored photo.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Re-encoded JPEG, named after the source file
    pub file: ImageFile,
    pub dimensions: Dimensions,
    pub original_type: String,
    pub original_size: u64,
}

impl ProcessedImage {
    /// Build a photo pointing at `src`.
    pub fn to_photo(&self, src: String) -> Photo {
        Photo {
            id: next_photo_id(),
            src,
            name: self.file.name.clone(),
            size: self.original_size,
            mime_type: JPEG_MIME.to_string(),
            dimensions: Some(self.dimensions),
            compressed_size: Some(self.file.bytes.len() as u64),
            original_type: Some(self.original_type.clone()),
            uploaded_at: None,
        }
    }

    /// Photo carrying the JPEG inline as a data URL.
    pub fn to_inline_photo(&self) -> Photo {
        self.to_photo(to_data_url(&self.file.bytes))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageProcessor {
    settings: ImageSettings,
}

impl ImageProcessor {
    pub fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> ImageSettings {
        self.settings
    }

    /// Process a file into a photo with an inline `src`.
    pub fn process(&self, file: &ImageFile) -> Result<Photo> {
        Ok(self.process_for_upload(file)?.to_inline_photo())
    }

    /// Process a file, keeping the encoded JPEG for upload.
    pub fn process_for_upload(&self, file: &ImageFile) -> Result<ProcessedImage> {
        let processed = encode(file, self.settings)?;
        tracing::debug!(
            name = %file.name,
            original_size = file.bytes.len(),
            compressed_size = processed.file.bytes.len(),
            width = processed.dimensions.width,
            height = processed.dimensions.height,
            "Image processed"
        );
        Ok(processed)
    }

    /// Re-encode an inline photo with `settings`.
    ///
    /// Remote photos are returned unchanged; so are inline photos the new
    /// encoding would not make smaller.
    pub fn recompress(&self, photo: &Photo, settings: ImageSettings) -> Result<Photo> {
        let Some(bytes) = decode_data_url(&photo.src) else {
            return Ok(photo.clone());
        };
        let source = ImageFile::new(photo.name.clone(), photo.mime_type.clone(), bytes);
        let processed = encode(&source, settings)?;

        if processed.file.bytes.len() >= source.bytes.len() {
            return Ok(photo.clone());
        }

        Ok(Photo {
            src: to_data_url(&processed.file.bytes),
            dimensions: Some(processed.dimensions),
            compressed_size: Some(processed.file.bytes.len() as u64),
            ..photo.clone()
        })
    }
}

fn encode(file: &ImageFile, settings: ImageSettings) -> Result<ProcessedImage> {
    if file.bytes.is_empty() {
        return Err(PortfolioError::Processing(format!(
            "{} could not be read (empty file)",
            file.name
        )));
    }

    let img = image::load_from_memory(&file.bytes).map_err(|e| {
        PortfolioError::Processing(format!("{} is not a decodable image: {}", file.name, e))
    })?;

    let (width, height) = fit_within(
        img.width(),
        img.height(),
        settings.max_width,
        settings.max_height,
    );
    let resized = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let jpeg = encode_jpeg(&resized, settings.jpeg_quality())
        .map_err(|e| PortfolioError::Processing(format!("{}: {}", file.name, e)))?;

    Ok(ProcessedImage {
        file: ImageFile::new(file.name.clone(), JPEG_MIME, jpeg),
        dimensions: Dimensions { width, height },
        original_type: file.mime_type.clone(),
        original_size: file.bytes.len() as u64,
    })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}

/// Scale `(width, height)` down to fit the bounds, preserving aspect ratio.
/// Never scales up.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, v);
    (
        scaled(width).min(max_width.max(1)),
        scaled(height).min(max_height.max(1)),
    )
}

pub fn to_data_url(jpeg: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(jpeg))
}

/// Bytes of a base64 `data:` URL, or `None` for anything else.
pub fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let rest = src.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    STANDARD.decode(payload).ok()
}

/// Unique photo id: creation time plus a process-wide sequence number.
pub fn next_photo_id() -> String {
    format!(
        "photo_{}_{}",
        Utc::now().timestamp_millis(),
        PHOTO_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}
