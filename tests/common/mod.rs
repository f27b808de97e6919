// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::{routing::get, Extension, Router};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use timetracker::config::Config;
use timetracker::cookie::SessionToken;
use timetracker::db::MemoryDb;
use timetracker::error::AppError;
use timetracker::models::Identity;
use timetracker::routes::{api, github, with_pipeline};
use timetracker::services::{AuthUser, GitHubClient, IdentityProvider};
use timetracker::AppState;

/// First id handed out by the test store.
#[allow(dead_code)]
pub const FIRST_USER_ID: u64 = 42;

/// Identity provider double: fixed code -> token and token -> login tables.
#[allow(dead_code)]
#[derive(Default)]
pub struct StubProvider {
    codes: HashMap<String, String>,
    tokens: HashMap<String, Identity>,
    checks: AtomicUsize,
}

#[allow(dead_code)]
impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `code` and exchange it for `token`.
    pub fn with_code(mut self, code: &str, token: &str) -> Self {
        self.codes.insert(code.to_string(), token.to_string());
        self
    }

    /// Accept `token` as belonging to `login`.
    pub fn with_token(mut self, token: &str, login: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            Identity {
                login: login.to_string(),
                id: 1000,
                avatar_url: format!("https://avatars.example/{login}"),
                name: None,
                email: None,
            },
        );
        self
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn login_url(&self) -> Result<String, AppError> {
        Ok("https://github.example/login/oauth/authorize?client_id=stub".to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionToken, AppError> {
        self.codes
            .get(code)
            .and_then(|token| SessionToken::parse(token))
            .ok_or_else(|| AppError::Provider("bad_verification_code".to_string()))
    }

    async fn check_token(&self, token: &SessionToken) -> Result<Identity, AppError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(token.as_str())
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

/// Router plus handles on its collaborators.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub provider: Arc<StubProvider>,
    pub db: MemoryDb,
    /// Calls that reached `/api/test/protected`
    pub handler_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }
}

/// Create a test app with the default test config.
#[allow(dead_code)]
pub fn create_test_app(provider: StubProvider) -> TestApp {
    create_test_app_with_config(Config::test_default(), provider)
}

/// Create a test app with the production routes plus two probes:
/// `/api/test/protected` counts calls, `/api/test/panic` panics after
/// authentication.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config, provider: StubProvider) -> TestApp {
    let provider = Arc::new(provider);
    let db = MemoryDb::with_first_id(FIRST_USER_ID);
    let github_client = GitHubClient::new(&config).expect("GitHub client");

    let state = Arc::new(AppState::new(
        config,
        provider.clone(),
        github_client,
        Arc::new(db.clone()),
    ));

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let counter = handler_calls.clone();

    let probes = Router::new()
        .route(
            "/api/test/protected",
            get(move |Extension(auth): Extension<AuthUser>| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    auth.user_id().to_string()
                }
            }),
        )
        .route(
            "/api/test/panic",
            get(|Extension(auth): Extension<AuthUser>| async move {
                if auth.user_id() > 0 {
                    panic!("handler fault for user {}", auth.user_id());
                }
                "unreachable"
            }),
        );

    let routes = github::routes().merge(api::routes()).merge(probes);
    let router = with_pipeline(routes, state.clone());

    TestApp {
        router,
        state,
        provider,
        db,
        handler_calls,
    }
}

/// GET `uri`, optionally with a session cookie.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("LoginData={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// POST a JSON login body.
#[allow(dead_code)]
pub fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/github/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
