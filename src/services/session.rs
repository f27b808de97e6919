// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session resolution: request cookie -> provider identity -> local user.
//!
//! With the cache disabled (the default) every resolution costs one round
//! trip to the identity provider. Revoking a token at GitHub therefore takes
//! effect on the very next request, at the price of that latency on every
//! protected call.

use axum_extra::extract::cookie::CookieJar;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cookie::{token_from_jar, SessionToken};
use crate::error::AppError;
use crate::models::User;
use crate::services::{IdentityProvider, UserDirectory};

/// Authenticated user attached to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Token the session was resolved from, for calls made on the user's behalf
    pub token: SessionToken,
}

impl AuthUser {
    pub fn user_id(&self) -> u64 {
        self.user.id
    }
}

#[derive(Clone)]
struct CachedLogin {
    login: String,
    expires_at: Instant,
}

/// Short-lived map from token digest to GitHub login.
///
/// Keys are SHA-256 digests so raw bearer tokens never sit in the map.
/// A zero TTL disables the cache entirely.
#[derive(Clone)]
pub struct SessionCache {
    ttl: Duration,
    entries: Arc<DashMap<String, CachedLogin>>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    fn key(token: &SessionToken) -> String {
        hex::encode(Sha256::digest(token.as_str().as_bytes()))
    }

    fn get(&self, token: &SessionToken) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let key = Self::key(token);
        let login = self
            .entries
            .get(&key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.login.clone());

        if login.is_none() {
            self.entries.remove(&key);
        }
        login
    }

    /// Cache `login` for `token`, dropping every expired entry first.
    fn insert(&self, token: &SessionToken, login: &str) {
        if !self.is_enabled() {
            return;
        }

        let now = Instant::now();
        self.purge_expired_at(now);
        self.entries.insert(
            Self::key(token),
            CachedLogin {
                login: login.to_string(),
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop entries whose TTL has passed.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    fn purge_expired_at(&self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves the user behind an inbound request.
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
    directory: UserDirectory,
    cache: SessionCache,
}

impl SessionResolver {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        directory: UserDirectory,
        cache: SessionCache,
    ) -> Self {
        Self {
            provider,
            directory,
            cache,
        }
    }

    /// Resolve the session cookie in `jar` to a local user.
    ///
    /// 1. Read the token from the cookie (`NoToken` if absent or malformed)
    /// 2. Ask the provider who owns it (`InvalidToken` if rejected)
    /// 3. Find the local user, creating it on first sight
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub async fn resolve(&self, jar: &CookieJar) -> Result<AuthUser, AppError> {
        let token = token_from_jar(jar)?;
        self.resolve_token(token).await
    }

    pub async fn resolve_token(&self, token: SessionToken) -> Result<AuthUser, AppError> {
        if let Some(login) = self.cache.get(&token) {
            if let Ok(user) = self.directory.get_by_external_login(&login).await {
                return Ok(AuthUser { user, token });
            }
        }

        let identity = self.provider.check_token(&token).await.map_err(|e| {
            if e.is_unauthenticated() {
                e
            } else {
                // A provider outage still means we couldn't authenticate
                tracing::warn!(error = %e, "Token check failed");
                AppError::InvalidToken
            }
        })?;

        let user = self.directory.find_or_create(&identity).await?;
        self.cache.insert(&token, &identity.login);

        Ok(AuthUser { user, token })
    }
}
