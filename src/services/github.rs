// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth and REST client.
//!
//! Handles:
//! - Building the authorization redirect URL
//! - Exchanging a one-time code for a bearer token
//! - Resolving a bearer token to the account behind it ("who am I")
//! - Repository lookups for the time entry UI
//!
//! There is no retry and no token caching in here. A failed call is reported
//! to the caller once; every HTTP call is bounded by the configured timeout.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::cookie::SessionToken;
use crate::error::AppError;
use crate::models::Identity;

const USER_AGENT: &str = concat!("timetracker/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const SEARCH_PAGE_SIZE: u32 = 20;

/// Operations the session layer needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Authorization URL the browser is sent to in order to log in.
    fn login_url(&self) -> Result<String, AppError>;

    /// Exchange a one-time authorization code for a bearer token.
    async fn exchange_code(&self, code: &str) -> Result<SessionToken, AppError>;

    /// Look up the account behind `token`.
    ///
    /// This is the only place token validity is decided. Rejected tokens
    /// yield [`AppError::InvalidToken`].
    async fn check_token(&self, token: &SessionToken) -> Result<Identity, AppError>;
}

/// GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    scope: String,
}

impl GitHubClient {
    /// Create a client from the OAuth app settings in `config`.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            oauth_url: config.github_oauth_url.clone(),
            api_url: config.github_api_url.clone(),
            client_id: config.github_client_id.clone(),
            client_secret: config.github_client_secret.clone(),
            redirect_url: config.github_redirect_url.clone(),
            scope: config.github_scope.clone(),
        })
    }

    /// Search repositories visible to the token's owner.
    pub async fn search_repos(
        &self,
        token: &SessionToken,
        query: &str,
    ) -> Result<Vec<Repository>, AppError> {
        let url = format!("{}/search/repositories", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, GITHUB_JSON)
            .query(&[
                ("q", query.to_string()),
                ("per_page", SEARCH_PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Repository search failed: {}", e)))?;

        let results: SearchResults = check_response_json(response, CallKind::Resource).await?;
        Ok(results.items)
    }

    /// List the branches of `owner/repo`.
    pub async fn branches(
        &self,
        token: &SessionToken,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Branch>, AppError> {
        let url = format!("{}/branches", self.repo_url(owner, repo));
        self.get_json(&url, token, CallKind::Resource).await
    }

    /// List recent commits of `owner/repo`.
    pub async fn commits(
        &self,
        token: &SessionToken,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Commit>, AppError> {
        let url = format!("{}/commits", self.repo_url(owner, repo));
        self.get_json(&url, token, CallKind::Resource).await
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        token: &SessionToken,
        kind: CallKind,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        check_response_json(response, kind).await
    }
}

#[async_trait]
impl IdentityProvider for GitHubClient {
    fn login_url(&self) -> Result<String, AppError> {
        if self.client_id.is_empty() || self.redirect_url.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "GitHub OAuth app is not configured"
            )));
        }

        Ok(format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&self.scope),
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionToken, AppError> {
        let response = self
            .http
            .post(format!("{}/login/oauth/access_token", self.oauth_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "GitHub token exchange failed");
            return Err(AppError::Provider(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        let exchange: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse token response: {}", e)))?;

        // GitHub reports a bad or reused code as 200 with an `error` field.
        if let Some(error) = exchange.error {
            tracing::warn!(
                error = %error,
                description = exchange.error_description.as_deref().unwrap_or(""),
                "GitHub rejected authorization code"
            );
            return Err(AppError::Provider(format!("Code rejected: {}", error)));
        }

        exchange
            .access_token
            .as_deref()
            .and_then(SessionToken::parse)
            .ok_or_else(|| AppError::Provider("Token response had no usable access_token".into()))
    }

    async fn check_token(&self, token: &SessionToken) -> Result<Identity, AppError> {
        let url = format!("{}/user", self.api_url);
        self.get_json(&url, token, CallKind::Identity).await
    }
}

/// What a GitHub call was asking about, which decides how a 403 reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// `GET /user`: a 403 means the token itself is no good.
    Identity,
    /// Repository lookups: a 403 means this token can't see that resource
    /// (no access, org SSO not authorized), not that the session is dead.
    Resource,
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    kind: CallKind,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        // Unauthorized - token revoked, expired or never valid
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::InvalidToken);
        }

        // 403 is also GitHub's rate limit response, so only look further at it
        // when the quota isn't exhausted.
        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0");
        if status == StatusCode::FORBIDDEN && !rate_limited {
            return Err(match kind {
                CallKind::Identity => AppError::InvalidToken,
                CallKind::Resource => AppError::NotFound("GitHub resource".to_string()),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("GitHub resource".to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        if rate_limited {
            tracing::warn!("GitHub rate limit hit");
        }
        return Err(AppError::Provider(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Provider(format!("JSON parse error: {}", e)))
}

/// Token exchange response from GitHub OAuth.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    items: Vec<Repository>,
}

/// Repository summary as returned to the SPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub date: String,
}
