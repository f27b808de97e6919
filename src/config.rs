// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup and passed explicitly to the components that need it.
//! Nothing here changes for the life of the process.

use std::env;
use std::time::Duration;

/// Deployment mode taken from `HOSTING_ENV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingEnv {
    /// Local development: session cookies are sent without `Secure`.
    Development,
    /// Anything else, carrying the raw value for logging.
    Deployed(String),
}

impl HostingEnv {
    pub fn parse(raw: &str) -> Self {
        if raw == "Development" {
            HostingEnv::Development
        } else {
            HostingEnv::Deployed(raw.to_string())
        }
    }

    /// Whether session cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !matches!(self, HostingEnv::Development)
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Deployment mode (controls the `Secure` cookie flag)
    pub hosting_env: HostingEnv,
    /// Frontend URL, allowed as a CORS origin
    pub frontend_url: String,

    // --- GitHub OAuth app ---
    pub github_client_id: String,
    pub github_client_secret: String,
    /// Where GitHub sends the browser back to with `?code=`
    pub github_redirect_url: String,
    /// Space separated OAuth scopes
    pub github_scope: String,
    /// Base URL for the OAuth endpoints (`/login/oauth/...`)
    pub github_oauth_url: String,
    /// Base URL for the REST API
    pub github_api_url: String,

    /// Upper bound on every call to the identity provider
    pub provider_timeout: Duration,
    /// Lifetime of a cached token resolution; zero disables the cache
    pub session_cache_ttl: Duration,
}

const DEFAULT_FRONTEND_URL: &str = "http://localhost:4200";
const DEFAULT_GITHUB_SCOPE: &str = "repo read:user user:email";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let frontend_url = env::var("FRONTEND_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string());

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            hosting_env: HostingEnv::parse(
                &env::var("HOSTING_ENV").unwrap_or_else(|_| "Production".to_string()),
            ),
            github_client_id: required("GITHUB_CLIENT_ID")?,
            github_client_secret: required("GITHUB_CLIENT_SECRET")?,
            github_redirect_url: env::var("GITHUB_REDIRECT_URL")
                .unwrap_or_else(|_| format!("{}/auth/github", frontend_url)),
            github_scope: env::var("GITHUB_SCOPE")
                .unwrap_or_else(|_| DEFAULT_GITHUB_SCOPE.to_string()),
            github_oauth_url: env::var("GITHUB_OAUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://github.com".to_string()),
            github_api_url: env::var("GITHUB_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            provider_timeout: Duration::from_secs(parse_var(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?),
            session_cache_ttl: Duration::from_secs(parse_var("SESSION_CACHE_TTL_SECS", 0)?),
            frontend_url,
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            hosting_env: HostingEnv::Deployed("Test".to_string()),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            github_client_id: "test_client_id".to_string(),
            github_client_secret: "test_secret".to_string(),
            github_redirect_url: format!("{}/auth/github", DEFAULT_FRONTEND_URL),
            github_scope: DEFAULT_GITHUB_SCOPE.to_string(),
            github_oauth_url: "https://github.com".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            session_cache_ttl: Duration::ZERO,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
