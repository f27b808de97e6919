// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External identity as reported by the identity provider.

use serde::{Deserialize, Serialize};

/// Profile of the account behind a bearer token.
///
/// Fetched fresh from GitHub on every token check and never stored as-is;
/// the local [`User`](super::User) is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-unique login name
    pub login: String,
    /// GitHub's numeric account id
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    /// Display name (optional on GitHub)
    #[serde(default)]
    pub name: Option<String>,
    /// Public email (optional on GitHub)
    #[serde(default)]
    pub email: Option<String>,
}
