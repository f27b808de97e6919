// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers and the request pipeline around them.

pub mod api;
pub mod github;

use crate::config::{Config, HostingEnv};
use crate::middleware::{catch_panic, require_session, security::add_security_headers};
use crate::AppState;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// `{ "data": ... }` envelope used by the SPA's API service.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "ClientApp/src/app/models/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .merge(github::routes())
        .merge(api::routes());

    with_pipeline(routes, state)
}

/// Wrap `routes` in the request pipeline.
///
/// Stages run top to bottom on the way in, each handing the request to the
/// next one:
/// 1. panic recovery
/// 2. request tracing
/// 3. CORS (answers preflights itself)
/// 4. security headers
/// 5. session authentication for `/api/*`
pub fn with_pipeline(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let pipeline = ServiceBuilder::new()
        .layer(middleware::from_fn(catch_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            add_security_headers,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    routes.layer(pipeline).with_state(state)
}

/// CORS layer - allow requests from the frontend URL, plus localhost in Development
fn cors_layer(config: &Config) -> CorsLayer {
    let frontend_url = config.frontend_url.clone();
    let allow_local = config.hosting_env == HostingEnv::Development;
    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .map(|o| is_allowed_origin(o, &frontend_url, allow_local))
                    .unwrap_or(false)
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Exact frontend match, or a loopback host on any port when `allow_local`.
fn is_allowed_origin(origin: &str, frontend_url: &str, allow_local: bool) -> bool {
    if origin == frontend_url {
        return true;
    }
    if !allow_local {
        return false;
    }

    let Ok(uri) = origin.parse::<Uri>() else {
        return false;
    };
    let bare_authority = uri
        .authority()
        .is_some_and(|a| !a.as_str().contains('@'));
    let no_path = matches!(uri.path_and_query().map(|p| p.as_str()), None | Some("/"));

    uri.scheme_str() == Some("http")
        && bare_authority
        && no_path
        && matches!(uri.host(), Some("localhost") | Some("127.0.0.1"))
}
