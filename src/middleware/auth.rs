// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! Every `/api/*` request except the login routes must carry a session cookie
//! whose token the identity provider still accepts. Rejected requests never
//! reach a handler.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// API routes reachable without a session. These are the ones that create it.
pub const PUBLIC_API_ROUTES: &[&str] = &["/api/github/url", "/api/github/login"];

/// Whether a request to `path` has to be authenticated.
pub fn requires_session(path: &str) -> bool {
    (path == "/api" || path.starts_with("/api/")) && !PUBLIC_API_ROUTES.contains(&path)
}

/// Middleware that requires a valid session cookie.
///
/// On success the resolved [`AuthUser`](crate::services::AuthUser) is inserted
/// into the request extensions.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !requires_session(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let auth_user = state.sessions.resolve(&jar).await.map_err(|err| {
        if err.is_unauthenticated() {
            tracing::debug!(
                path = %request.uri().path(),
                reason = %err,
                "Rejected unauthenticated request"
            );
        }
        err
    })?;

    tracing::debug!(user_id = auth_user.user_id(), "Session resolved");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
