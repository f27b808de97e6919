// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timetracker: track time against GitHub organisations and repositories
//!
//! This crate provides the backend API: GitHub OAuth login, cookie sessions,
//! and the request pipeline that authenticates every API call.

pub mod config;
pub mod cookie;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{GitHubClient, IdentityProvider, SessionResolver, UserDirectory};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    /// Concrete GitHub client for the repository lookups
    pub github: GitHubClient,
    pub directory: UserDirectory,
    pub sessions: SessionResolver,
}

impl AppState {
    /// Wire the shared state from its collaborators.
    ///
    /// `identity` decides who a token belongs to; in production it is the
    /// same GitHub client as `github`.
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        github: GitHubClient,
        store: Arc<dyn db::UserStore>,
    ) -> Self {
        let directory = UserDirectory::new(store);
        let cache = services::SessionCache::new(config.session_cache_ttl);
        let sessions = SessionResolver::new(identity.clone(), directory.clone(), cache);

        Self {
            config,
            identity,
            github,
            directory,
            sessions,
        }
    }
}
