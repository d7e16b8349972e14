// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use photo_portfolio::client::{PortfolioError, ValidationError};
use photo_portfolio::error::{AppError, ErrorResponse};

#[test]
fn test_app_error_status_codes() {
    assert_eq!(
        AppError::NotFound("x".to_string()).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::BadRequest("x".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::PayloadTooLarge("x".to_string()).status(),
        StatusCode::PAYLOAD_TOO_LARGE
    );
    assert_eq!(
        AppError::Database("x".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Storage("x".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let response = AppError::BadRequest("userId is required".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(!err.success);
    assert_eq!(err.error, "bad_request");
    assert_eq!(err.details.as_deref(), Some("userId is required"));
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let response = AppError::Database("connection reset by peer".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.error, "database_error");
    assert!(err.details.is_none());
}

#[test]
fn test_validation_messages_name_the_limits() {
    assert_eq!(
        ValidationError::PortfolioLimit.to_string(),
        "You can create at most 10 portfolios"
    );

    let err: PortfolioError = ValidationError::EmptyTitle.into();
    assert_eq!(err.to_string(), "Portfolio title is required");
    assert!(!err.is_quota_exceeded());
}

#[test]
fn test_quota_error() {
    let err = PortfolioError::QuotaExceeded {
        needed: 2048,
        quota: 1024,
    };
    assert!(err.is_quota_exceeded());
    assert!(err.to_string().contains("2048"));
}
