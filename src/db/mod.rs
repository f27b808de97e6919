// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer for user records.
//!
//! The directory talks to storage through [`UserStore`]; uniqueness of the
//! external login is the store's job, not the caller's.

pub mod memory;

pub use memory::MemoryDb;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{NewUser, User};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this external login already exists.
    #[error("User already exists for login {0}")]
    Conflict(String),

    #[error("{0}")]
    Backend(String),
}

/// Persistence contract for local users.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn user_exists(&self, login: &str) -> Result<bool, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] if the login is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_id(&self, login: &str) -> Result<Option<u64>, StoreError>;

    /// Refresh the `updated` timestamp and avatar of an existing user.
    async fn touch_user(
        &self,
        login: &str,
        avatar: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;
}
