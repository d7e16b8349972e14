// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use photo_portfolio::client::ImageFile;
use photo_portfolio::config::Config;
use photo_portfolio::db::{Database, FirestoreDb, MemoryDb};
use photo_portfolio::models::{Photo, Portfolio};
use photo_portfolio::routes::create_router;
use photo_portfolio::services::BlobStore;
use photo_portfolio::AppState;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A test app plus the scratch directory holding its uploads.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub upload_dir: TempDir,
}

async fn build_state(config: Config, db: Database) -> (Arc<AppState>, TempDir) {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let config = Config {
        upload_dir: upload_dir.path().to_path_buf(),
        ..config
    };
    let blobs = BlobStore::new(&config.upload_dir, &config.public_base_url)
        .await
        .expect("Failed to create blob store");

    let state = Arc::new(AppState { config, db, blobs });
    (state, upload_dir)
}

/// Create a test app backed by the in-memory store.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with_db(Database::Memory(MemoryDb::new())).await
}

/// Create a test app with the given database.
#[allow(dead_code)]
pub async fn create_test_app_with_db(db: Database) -> TestApp {
    let (state, upload_dir) = build_state(Config::test_default(), db).await;
    TestApp {
        router: create_router(state.clone()),
        state,
        upload_dir,
    }
}

/// A running server on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<AppState>,
    _upload_dir: TempDir,
}

/// Serve `router` on an ephemeral port in the background.
#[allow(dead_code)]
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Start the full API in memory mode, with upload URLs pointing at itself.
#[allow(dead_code)]
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(Config::test_default()).await
}

/// Like [`spawn_test_server`], starting from `config`.
#[allow(dead_code)]
pub async fn spawn_test_server_with(config: Config) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let config = Config {
        public_base_url: base_url.clone(),
        ..config
    };
    let (state, upload_dir) = build_state(config, Database::Memory(MemoryDb::new())).await;
    let router = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url,
        state,
        _upload_dir: upload_dir,
    }
}

/// A base URL nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Encode a generated gradient image.
#[allow(dead_code)]
pub fn sample_image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

#[allow(dead_code)]
pub fn sample_png(name: &str, width: u32, height: u32) -> ImageFile {
    ImageFile::new(name, "image/png", sample_image_bytes(width, height, ImageFormat::Png))
}

/// `n` distinct small PNG files.
#[allow(dead_code)]
pub fn sample_files(n: usize) -> Vec<ImageFile> {
    (0..n)
        .map(|i| sample_png(&format!("photo-{}.png", i), 32 + i as u32, 24))
        .collect()
}

#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("Failed to parse timestamp")
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn test_photo(id: &str, src: &str) -> Photo {
    Photo {
        id: id.to_string(),
        src: src.to_string(),
        name: format!("{}.jpg", id),
        size: 1024,
        mime_type: "image/jpeg".to_string(),
        dimensions: None,
        compressed_size: None,
        original_type: None,
        uploaded_at: None,
    }
}

/// A portfolio with `photos` remote photos.
#[allow(dead_code)]
pub fn test_portfolio(id: &str, title: &str, photos: usize) -> Portfolio {
    let now = parse_time("2026-03-01T12:00:00Z");
    Portfolio {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        photos: (0..photos)
            .map(|i| {
                test_photo(
                    &format!("{}_photo_{}", id, i),
                    &format!("https://cdn.example.com/{}/{}.jpg", id, i),
                )
            })
            .collect(),
        created_at: now,
        updated_at: now,
    }
}
