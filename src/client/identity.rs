// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session identity resolution.
//!
//! Fallback chain: external identity provider (bounded by a deadline), then
//! the token stored under [`SESSION_KEY`], then a freshly generated token
//! that is stored for the next session.

use crate::client::error::{PortfolioError, Result};
use crate::client::local::{LocalStorage, SESSION_KEY};
use crate::models::is_valid_id;
use ring::rand::{SecureRandom, SystemRandom};
use std::future::Future;
use std::time::Duration;

const TOKEN_BYTES: usize = 16;

/// Identity asserted by an embedding host (e.g. a Farcaster mini-app context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUser {
    /// Numeric Farcaster id
    pub fid: u64,
    pub username: Option<String>,
}

/// Source of an externally provided identity.
pub trait IdentityProvider {
    /// Resolve the host's user, `Ok(None)` when running outside a host.
    fn user_context(&self) -> impl Future<Output = Result<Option<ExternalUser>>>;
}

/// Provider for sessions that are never embedded in a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentityProvider;

impl IdentityProvider for NoIdentityProvider {
    async fn user_context(&self) -> Result<Option<ExternalUser>> {
        Ok(None)
    }
}

/// Provider with a fixed answer, for hosts that hand the context over up front.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider(pub Option<ExternalUser>);

impl IdentityProvider for StaticIdentityProvider {
    async fn user_context(&self) -> Result<Option<ExternalUser>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    External,
    Stored,
    Generated,
}

/// The resolved storage partition key for this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub source: IdentitySource,
}

/// Resolve the session identity through the fallback chain.
pub async fn resolve_identity<P: IdentityProvider>(
    provider: &P,
    storage: &LocalStorage,
    timeout: Duration,
) -> Result<SessionIdentity> {
    match tokio::time::timeout(timeout, provider.user_context()).await {
        Ok(Ok(Some(user))) => {
            tracing::info!(
                fid = user.fid,
                username = user.username.as_deref().unwrap_or(""),
                "Using external identity"
            );
            return Ok(SessionIdentity {
                user_id: external_user_id(&user),
                source: IdentitySource::External,
            });
        }
        Ok(Ok(None)) => tracing::debug!("No external identity context"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Identity provider failed"),
        Err(_) => tracing::warn!(
            timeout_ms = timeout.as_millis() as u64,
            "Identity provider timed out"
        ),
    }

    // A storage read error also falls through to a fresh token.
    let stored = match storage.get(SESSION_KEY).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read stored session id");
            None
        }
    };

    if let Some(stored) = stored {
        let stored = stored.trim();
        if is_valid_id(stored) {
            return Ok(SessionIdentity {
                user_id: stored.to_string(),
                source: IdentitySource::Stored,
            });
        }
        tracing::warn!("Ignoring malformed stored session id");
    }

    let user_id = generate_session_token()?;
    match storage.set(SESSION_KEY, &user_id).await {
        Ok(()) => tracing::info!(user_id = %user_id, "Generated new session identity"),
        Err(e) => tracing::warn!(
            user_id = %user_id,
            error = %e,
            "Generated session identity could not be stored, using it for this session only"
        ),
    }

    Ok(SessionIdentity {
        user_id,
        source: IdentitySource::Generated,
    })
}

/// Partition key for an externally identified user.
pub fn external_user_id(user: &ExternalUser) -> String {
    format!("farcaster_{}", user.fid)
}

/// Random session token, `user_` followed by 32 hex characters.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| PortfolioError::Storage("system random source unavailable".to_string()))?;
    Ok(format!("user_{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_valid_ids() {
        let token = generate_session_token().unwrap();
        assert!(token.starts_with("user_"));
        assert_eq!(token.len(), "user_".len() + TOKEN_BYTES * 2);
        assert!(is_valid_id(&token));
        assert_ne!(token, generate_session_token().unwrap());
    }

    #[test]
    fn test_external_user_id() {
        let user = ExternalUser {
            fid: 4242,
            username: None,
        };
        assert_eq!(external_user_id(&user), "farcaster_4242");
    }
}
