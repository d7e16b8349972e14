// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio collection API tests (in-memory backend).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use photo_portfolio::error::ErrorResponse;
use photo_portfolio::models::Portfolio;
use photo_portfolio::routes::portfolios::{
    DeletePortfolioResponse, PortfoliosResponse, PublicPortfolioResponse, SavePortfoliosResponse,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::test_portfolio;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).expect("unexpected response body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn save(user_id: &str, portfolios: &[Portfolio]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/portfolios")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "userId": user_id, "portfolios": portfolios }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = common::create_test_app().await;
    let (status, body) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = parse(&body);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_load_requires_user_id() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, get("/api/portfolios")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = parse(&body);
    assert!(!err.success);
    assert_eq!(err.error, "bad_request");

    let (status, _) = send(&app.router, get("/api/portfolios?userId=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejects_unsafe_user_id() {
    let app = common::create_test_app().await;

    let (status, _) = send(&app.router, get("/api/portfolios?userId=..%2Fetc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, save("a b", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_user_has_empty_collection() {
    let app = common::create_test_app().await;
    let (status, body) = send(&app.router, get("/api/portfolios?userId=user_new")).await;

    assert_eq!(status, StatusCode::OK);
    let body: PortfoliosResponse = parse(&body);
    assert!(body.success);
    assert_eq!(body.count, 0);
    assert!(body.portfolios.is_empty());
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let app = common::create_test_app().await;
    let portfolios = vec![
        test_portfolio("portfolio_1", "Street", 3),
        test_portfolio("portfolio_2", "Portraits", 0),
    ];

    let (status, body) = send(&app.router, save("user_rt", &portfolios)).await;
    assert_eq!(status, StatusCode::OK);
    let saved: SavePortfoliosResponse = parse(&body);
    assert_eq!(saved.saved, 2);
    assert_eq!(saved.metadata.portfolio_count, 2);
    assert_eq!(saved.metadata.total_photos, 3);

    let (status, body) = send(&app.router, get("/api/portfolios?userId=user_rt")).await;
    assert_eq!(status, StatusCode::OK);
    let loaded: PortfoliosResponse = parse(&body);
    assert_eq!(loaded.count, 2);
    assert_eq!(loaded.portfolios, portfolios);

    // Collections are partitioned by user.
    let (_, body) = send(&app.router, get("/api/portfolios?userId=someone_else")).await;
    let other: PortfoliosResponse = parse(&body);
    assert!(other.portfolios.is_empty());
}

#[tokio::test]
async fn test_save_is_full_replace() {
    let app = common::create_test_app().await;
    send(
        &app.router,
        save(
            "user_replace",
            &[
                test_portfolio("portfolio_1", "One", 1),
                test_portfolio("portfolio_2", "Two", 1),
            ],
        ),
    )
    .await;

    let only = vec![test_portfolio("portfolio_3", "Three", 2)];
    let (status, _) = send(&app.router, save("user_replace", &only)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app.router, get("/api/portfolios?userId=user_replace")).await;
    let loaded: PortfoliosResponse = parse(&body);
    assert_eq!(loaded.portfolios, only);
}

#[tokio::test]
async fn test_save_rejects_ceiling_violations() {
    let app = common::create_test_app().await;

    let too_many: Vec<Portfolio> = (0..11)
        .map(|i| test_portfolio(&format!("portfolio_{}", i), "Many", 0))
        .collect();
    let (status, body) = send(&app.router, save("user_limits", &too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = parse(&body);
    assert!(err.details.unwrap().contains("too many portfolios"));

    let (status, _) = send(
        &app.router,
        save("user_limits", &[test_portfolio("portfolio_1", "Crowded", 11)]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        save(
            "user_limits",
            &[
                test_portfolio("portfolio_1", "A", 0),
                test_portfolio("portfolio_1", "B", 0),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was written by the rejected saves.
    let (_, body) = send(&app.router, get("/api/portfolios?userId=user_limits")).await;
    let loaded: PortfoliosResponse = parse(&body);
    assert_eq!(loaded.count, 0);
}

#[tokio::test]
async fn test_save_accepts_exact_ceilings() {
    let app = common::create_test_app().await;
    let full: Vec<Portfolio> = (0..10)
        .map(|i| test_portfolio(&format!("portfolio_{}", i), "Full", 10))
        .collect();

    let (status, body) = send(&app.router, save("user_full", &full)).await;
    assert_eq!(status, StatusCode::OK);
    let saved: SavePortfoliosResponse = parse(&body);
    assert_eq!(saved.metadata.total_photos, 100);
}

#[tokio::test]
async fn test_save_rejects_malformed_body() {
    let app = common::create_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/portfolios")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"userId": "user_1"}"#))
        .unwrap();

    let (status, _) = send(&app.router, request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = common::create_test_app().await;
    send(
        &app.router,
        save(
            "user_del",
            &[
                test_portfolio("portfolio_1", "Keep", 1),
                test_portfolio("portfolio_2", "Drop", 1),
            ],
        ),
    )
    .await;

    let uri = "/api/portfolios?userId=user_del&portfolioId=portfolio_2";
    let (status, body) = send(&app.router, delete(uri)).await;
    assert_eq!(status, StatusCode::OK);
    let first: DeletePortfolioResponse = parse(&body);
    assert!(first.deleted);
    assert_eq!(first.remaining, 1);

    let (status, body) = send(&app.router, delete(uri)).await;
    assert_eq!(status, StatusCode::OK);
    let second: DeletePortfolioResponse = parse(&body);
    assert!(!second.deleted);
    assert_eq!(second.remaining, 1);

    let (_, body) = send(&app.router, get("/api/portfolios?userId=user_del")).await;
    let loaded: PortfoliosResponse = parse(&body);
    assert_eq!(loaded.portfolios.len(), 1);
    assert_eq!(loaded.portfolios[0].id, "portfolio_1");
}

#[tokio::test]
async fn test_delete_requires_both_ids() {
    let app = common::create_test_app().await;

    let (status, _) = send(&app.router, delete("/api/portfolios?userId=user_1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, delete("/api/portfolios?portfolioId=portfolio_1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_view_counts_views() {
    let app = common::create_test_app().await;
    send(
        &app.router,
        save("user_pub", &[test_portfolio("portfolio_1", "Street", 2)]),
    )
    .await;

    let uri = "/api/portfolio/user_pub/portfolio_1";
    let (status, body) = send(&app.router, get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    let first: PublicPortfolioResponse = parse(&body);
    assert_eq!(first.portfolio.title, "Street");
    assert_eq!(first.views, 1);

    let (_, body) = send(&app.router, get(uri)).await;
    let second: PublicPortfolioResponse = parse(&body);
    assert_eq!(second.views, 2);
}

#[tokio::test]
async fn test_public_view_missing_portfolio() {
    let app = common::create_test_app().await;
    let (status, body) = send(&app.router, get("/api/portfolio/user_pub/portfolio_404")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorResponse = parse(&body);
    assert_eq!(err.error, "not_found");
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let app = common::create_test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(get("/api/portfolios?userId=user_1"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
