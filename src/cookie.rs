// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie codec.
//!
//! The session cookie carries the GitHub bearer token verbatim. The token is
//! opaque to us: we never sign, parse or expire it ourselves.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::fmt;
use time::{Duration, OffsetDateTime};

use crate::error::AppError;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "LoginData";

/// Session cookie lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Longest token we accept from a cookie.
const MAX_TOKEN_LEN: usize = 512;

/// Opaque bearer token issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Validate the raw cookie value. Empty, oversized, or values with
    /// characters outside printable ASCII are treated as malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_TOKEN_LEN
            && raw.bytes().all(|b| b.is_ascii_graphic() && b != b';' && b != b',');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Read the session token out of the request cookies.
pub fn token_from_jar(jar: &CookieJar) -> Result<SessionToken, AppError> {
    let cookie = jar.get(SESSION_COOKIE_NAME).ok_or(AppError::NoToken)?;
    SessionToken::parse(cookie.value()).ok_or(AppError::NoToken)
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    session_cookie_at(token, secure, OffsetDateTime::now_utc())
}

fn session_cookie_at(token: &SessionToken, secure: bool, now: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.as_str().to_string()))
        .path("/")
        .expires(now + Duration::days(SESSION_TTL_DAYS))
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}
