// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Share links: preview HTML for social crawlers, redirect for people.

use crate::error::Result;
use crate::routes::portfolios::require_id;
use crate::services::share::{is_social_crawler, portfolio_page_url, render_preview};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

/// CSP for the preview page: inline markup only, remote images allowed.
const PREVIEW_CSP: &str = "default-src 'none'; img-src https: http:; style-src 'unsafe-inline'";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/share/{user_id}/{portfolio_id}", get(share_portfolio))
}

async fn share_portfolio(
    State(state): State<Arc<AppState>>,
    Path((user_id, portfolio_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    let user_id = require_id("userId", Some(user_id.as_str()))?;
    let portfolio_id = require_id("portfolioId", Some(portfolio_id.as_str()))?;
    let page_url = portfolio_page_url(&state.config.frontend_url, user_id, portfolio_id);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    if !is_social_crawler(user_agent) {
        return Ok((StatusCode::FOUND, [(header::LOCATION, page_url)]).into_response());
    }

    // Crawlers always get a card; a storage failure degrades to the generic one.
    let portfolio = match state.db.get_portfolios(user_id).await {
        Ok(portfolios) => portfolios.into_iter().find(|p| p.id == portfolio_id),
        Err(e) => {
            tracing::warn!(error = %e, user_id, portfolio_id, "Share preview lookup failed");
            None
        }
    };

    tracing::debug!(
        user_id,
        portfolio_id,
        found = portfolio.is_some(),
        user_agent = user_agent.unwrap_or(""),
        "Serving share preview"
    );

    let html = render_preview(portfolio.as_ref(), &page_url);
    Ok((
        [
            (header::CONTENT_SECURITY_POLICY, PREVIEW_CSP),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        Html(html),
    )
        .into_response())
}
