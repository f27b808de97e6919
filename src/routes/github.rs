// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth login and repository lookup routes.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::cookie::session_cookie;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::routes::DataResponse;
use crate::services::github::{Branch, Commit, Repository};
use crate::services::AuthUser;
use crate::AppState;

/// GitHub authorization codes are 20 characters; leave generous headroom.
const MAX_SESSION_CODE_LEN: usize = 256;
const MAX_SEARCH_QUERY_LEN: usize = 256;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/github/url", get(login_url))
        .route("/api/github/login", post(login))
        .route("/api/github/search", get(search_repos))
        .route("/api/github/repo/{owner}/{repo}/branches", get(branches))
        .route("/api/github/repo/{owner}/{repo}/commits", get(commits))
}

/// URL to send the browser to for GitHub login.
async fn login_url(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse<String>>> {
    let url = state.identity.login_url()?;
    Ok(DataResponse::new(url))
}

/// Body of the login request, posted by the SPA after GitHub redirects back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub session_code: String,
}

/// Complete the OAuth flow: exchange the code, find or create the user and
/// hand the token back as the session cookie.
///
/// Any failure after the body is parsed is a 500; the client has to start
/// the OAuth flow over.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<User>)> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let code = request.session_code.trim();
    if code.is_empty() || code.len() > MAX_SESSION_CODE_LEN {
        return Err(AppError::BadRequest("Invalid sessionCode".to_string()));
    }

    tracing::info!("Exchanging authorization code for token");
    let token = state.identity.exchange_code(code).await?;

    // The token was minted a moment ago, so a rejection here is a provider fault.
    let identity = state
        .identity
        .check_token(&token)
        .await
        .map_err(|e| match e {
            AppError::InvalidToken | AppError::NoToken => {
                AppError::Provider("Fresh token rejected by provider".to_string())
            }
            other => other,
        })?;

    let user = state.directory.record_login(&identity).await?;

    let cookie = session_cookie(&token, state.config.hosting_env.secure_cookies());

    tracing::info!(
        login = %identity.login,
        user_id = user.id,
        "Login successful, session cookie issued"
    );

    Ok((jar.add(cookie), Json(user)))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
}

/// Search GitHub repositories with the caller's token.
async fn search_repos(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<DataResponse<Vec<Repository>>>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(DataResponse::new(Vec::new()));
    }
    if query.len() > MAX_SEARCH_QUERY_LEN {
        return Err(AppError::BadRequest("Search query too long".to_string()));
    }

    let repos = state.github.search_repos(&auth.token, query).await?;
    Ok(DataResponse::new(repos))
}

async fn branches(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<DataResponse<Vec<Branch>>>> {
    let branches = state.github.branches(&auth.token, &owner, &repo).await?;
    Ok(DataResponse::new(branches))
}

async fn commits(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<DataResponse<Vec<Commit>>>> {
    let commits = state.github.commits(&auth.token, &owner, &repo).await?;
    Ok(DataResponse::new(commits))
}
