// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio collection routes: load, replace, delete one, public view.

use crate::error::{AppError, Result};
use crate::models::{check_collection, is_valid_id, Portfolio, PortfolioMetadata};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/portfolios",
            get(get_portfolios)
                .post(save_portfolios)
                .delete(delete_portfolio),
        )
        .route(
            "/api/portfolio/{user_id}/{portfolio_id}",
            get(get_public_portfolio),
        )
}

/// Validate a user or portfolio identifier taken from the request.
pub(crate) fn require_id<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        None | Some("") => Err(AppError::BadRequest(format!("{} is required", field))),
        Some(id) if !is_valid_id(id) => Err(AppError::BadRequest(format!(
            "{} must be 1-128 characters of [A-Za-z0-9_-]",
            field
        ))),
        Some(id) => Ok(id),
    }
}

// ─── Load ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PortfoliosResponse {
    pub success: bool,
    pub portfolios: Vec<Portfolio>,
    pub count: u32,
}

/// Load a user's whole collection.
async fn get_portfolios(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PortfoliosResponse>> {
    let user_id = require_id("userId", params.user_id.as_deref())?;

    let portfolios = state.db.get_portfolios(user_id).await?;
    tracing::debug!(user_id, count = portfolios.len(), "Loaded portfolios");

    Ok(Json(PortfoliosResponse {
        success: true,
        count: portfolios.len() as u32,
        portfolios,
    }))
}

// ─── Save ────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavePortfoliosRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    pub portfolios: Vec<Portfolio>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SavePortfoliosResponse {
    pub success: bool,
    pub saved: u32,
    pub metadata: PortfolioMetadata,
}

/// Replace a user's whole collection (last writer wins).
async fn save_portfolios(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SavePortfoliosRequest>,
) -> Result<Json<SavePortfoliosResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = require_id("userId", Some(request.user_id.as_str()))?;
    check_collection(&request.portfolios).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let metadata = state
        .db
        .set_portfolios(user_id, &request.portfolios)
        .await?;

    tracing::info!(
        user_id,
        portfolios = metadata.portfolio_count,
        photos = metadata.total_photos,
        "Portfolios saved"
    );

    Ok(Json(SavePortfoliosResponse {
        success: true,
        saved: metadata.portfolio_count,
        metadata,
    }))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteQuery {
    user_id: Option<String>,
    portfolio_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeletePortfolioResponse {
    pub success: bool,
    /// Whether a portfolio with the id existed
    pub deleted: bool,
    pub remaining: u32,
}

/// Remove one portfolio from a user's collection. Deleting an absent id is a
/// no-op that still succeeds.
async fn delete_portfolio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteQuery>,
) -> Result<Json<DeletePortfolioResponse>> {
    let user_id = require_id("userId", params.user_id.as_deref())?;
    let portfolio_id = require_id("portfolioId", params.portfolio_id.as_deref())?;

    let mut portfolios = state.db.get_portfolios(user_id).await?;
    let before = portfolios.len();
    portfolios.retain(|p| p.id != portfolio_id);
    let deleted = portfolios.len() != before;

    if deleted {
        state.db.set_portfolios(user_id, &portfolios).await?;
        tracing::info!(user_id, portfolio_id, "Portfolio deleted");
    }

    Ok(Json(DeletePortfolioResponse {
        success: true,
        deleted,
        remaining: portfolios.len() as u32,
    }))
}

// ─── Public View ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicPortfolioResponse {
    pub success: bool,
    pub portfolio: Portfolio,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub views: u64,
}

/// Read-only public copy of one portfolio; counts the view.
async fn get_public_portfolio(
    State(state): State<Arc<AppState>>,
    Path((user_id, portfolio_id)): Path<(String, String)>,
) -> Result<Json<PublicPortfolioResponse>> {
    let user_id = require_id("userId", Some(user_id.as_str()))?;
    let portfolio_id = require_id("portfolioId", Some(portfolio_id.as_str()))?;

    let portfolio = state
        .db
        .get_portfolios(user_id)
        .await?
        .into_iter()
        .find(|p| p.id == portfolio_id)
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {} not found", portfolio_id)))?;

    // A failed counter update should not hide the portfolio.
    let views = match state.db.increment_views(user_id, portfolio_id).await {
        Ok(views) => views,
        Err(e) => {
            tracing::warn!(error = %e, user_id, portfolio_id, "Failed to count view");
            0
        }
    };

    Ok(Json(PublicPortfolioResponse {
        success: true,
        portfolio,
        views,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("userId", Some(" user_1 ")).unwrap(), "user_1");
        assert!(matches!(
            require_id("userId", None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            require_id("userId", Some("a/b")),
            Err(AppError::BadRequest(_))
        ));
    }
}
