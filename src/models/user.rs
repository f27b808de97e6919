// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use super::Identity;

/// Local user record, one per GitHub login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "ClientApp/src/app/models/generated/")
)]
pub struct User {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// GitHub login this user signs in with
    pub github_user_id: String,
    pub avatar: String,
    #[serde(default)]
    pub organisations: Vec<Organisation>,
    #[serde(default)]
    pub api_clients: Vec<ApiClient>,
}

/// Organisation a user tracks time against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "ClientApp/src/app/models/generated/")
)]
pub struct Organisation {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub description: String,
    pub avatar: String,
    /// Where the organisation came from, e.g. "github"
    pub source: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Credentials for programmatic access on behalf of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "ClientApp/src/app/models/generated/")
)]
pub struct ApiClient {
    pub client_id: Uuid,
    /// Never sent back to the browser.
    #[serde(skip_serializing, default)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub secret_key: String,
    pub app_name: String,
    pub description: String,
    pub valid_till: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
}

/// Attributes for a user about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub github_user_id: String,
    pub avatar: String,
    pub created: DateTime<Utc>,
}

impl NewUser {
    /// Build from a provider profile, stamped with `now`.
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            // GitHub allows an empty display name; fall back to the login.
            name: identity
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| identity.login.clone()),
            email: identity.email.clone().unwrap_or_default(),
            github_user_id: identity.login.clone(),
            avatar: identity.avatar_url.clone(),
            created: now,
        }
    }

    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            created: self.created,
            updated: self.created,
            github_user_id: self.github_user_id,
            avatar: self.avatar,
            organisations: Vec::new(),
            api_clients: Vec::new(),
        }
    }
}
