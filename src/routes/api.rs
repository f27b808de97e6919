// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::models::User;
use crate::routes::DataResponse;
use crate::services::AuthUser;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use std::sync::Arc;

/// Session routes. Authentication is enforced by the pipeline in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(get_user))
        .route("/api/auth/isAuthenticated", get(is_authenticated))
}

/// Get the current user.
async fn get_user(Extension(auth): Extension<AuthUser>) -> Json<User> {
    Json(auth.user)
}

/// Only reachable with a resolved session; anything else got a 401 upstream.
async fn is_authenticated(Extension(auth): Extension<AuthUser>) -> Json<DataResponse<bool>> {
    tracing::debug!(user_id = auth.user_id(), "Session check");
    DataResponse::new(true)
}
