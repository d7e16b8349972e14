// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The server reads [`Config`]; the client core reads [`ClientConfig`]. Both
//! pick up a `.env` file when one is present.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Roughly what browsers grant a single origin in local storage.
const DEFAULT_LOCAL_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 3000;

/// Which key-value backend the server persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", s.to_string())),
        }
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL (CORS origin and share-link redirect target)
    pub frontend_url: String,
    /// Public base URL of this API, used to build upload URLs
    pub public_base_url: String,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// Directory where uploaded images are written
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = parse_var("PORT", DEFAULT_PORT)?;
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        let gcp_project_id = match storage_backend {
            StorageBackend::Firestore => {
                env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?
            }
            StorageBackend::Memory => {
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string())
            }
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            gcp_project_id,
            port,
            storage_backend,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Config for tests: in-memory storage, uploads under the given directory.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: DEFAULT_PORT,
            storage_backend: StorageBackend::Memory,
            upload_dir: env::temp_dir().join("photo-portfolio-test-uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Client-side configuration for the portfolio sync core.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the portfolio API (no trailing slash)
    pub api_url: String,
    /// Directory backing the local-fallback storage
    pub data_dir: PathBuf,
    /// Byte quota for the local-fallback storage
    pub local_quota_bytes: u64,
    /// Deadline for the external identity provider
    pub identity_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_url: env::var("PORTFOLIO_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", DEFAULT_PORT)),
            data_dir: env::var("PORTFOLIO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".photo-portfolio")),
            local_quota_bytes: parse_var("PORTFOLIO_LOCAL_QUOTA_BYTES", DEFAULT_LOCAL_QUOTA_BYTES)?,
            identity_timeout: Duration::from_millis(parse_var(
                "PORTFOLIO_IDENTITY_TIMEOUT_MS",
                DEFAULT_IDENTITY_TIMEOUT_MS,
            )?),
        })
    }

    /// Client config for tests rooted at `data_dir`.
    pub fn test_default(api_url: &str, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            data_dir: data_dir.into(),
            local_quota_bytes: DEFAULT_LOCAL_QUOTA_BYTES,
            identity_timeout: Duration::from_millis(200),
        }
    }
}

/// Read and parse an optional variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
