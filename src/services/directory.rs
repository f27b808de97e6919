// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maps GitHub identities to local users, creating them on first sight.

use chrono::Utc;
use std::sync::Arc;

use crate::db::{StoreError, UserStore};
use crate::error::AppError;
use crate::models::{Identity, NewUser, User};

/// Local user lookups keyed by GitHub login.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn exists(&self, login: &str) -> Result<bool, AppError> {
        Ok(self.store.user_exists(login).await?)
    }

    /// Insert a new user from a provider profile.
    ///
    /// Fails with [`AppError::Storage`] if the login is already taken; use
    /// [`find_or_create`](Self::find_or_create) unless that is what you want.
    pub async fn create(&self, identity: &Identity) -> Result<User, AppError> {
        let user = self
            .store
            .create_user(NewUser::from_identity(identity, Utc::now()))
            .await?;
        tracing::info!(login = %identity.login, user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn get_by_external_login(&self, login: &str) -> Result<User, AppError> {
        self.store
            .get_user_by_login(login)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", login)))
    }

    /// Local id for `login`, without materializing the whole user.
    pub async fn get_local_id(&self, login: &str) -> Result<u64, AppError> {
        self.store
            .get_user_id(login)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", login)))
    }

    /// Return the user for `identity`, creating it if this login is new.
    ///
    /// A concurrent first login for the same account surfaces as a store
    /// conflict, in which case the winner's record is read back.
    pub async fn find_or_create(&self, identity: &Identity) -> Result<User, AppError> {
        if let Some(user) = self.store.get_user_by_login(&identity.login).await? {
            return Ok(user);
        }

        tracing::info!(login = %identity.login, "GitHub user not in directory, creating");

        match self
            .store
            .create_user(NewUser::from_identity(identity, Utc::now()))
            .await
        {
            Ok(user) => {
                tracing::info!(login = %identity.login, user_id = user.id, "User created");
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(login = %identity.login, "Lost first-login race, re-reading user");
                self.get_by_external_login(&identity.login).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Login completion: find or create the user and refresh its timestamp.
    pub async fn record_login(&self, identity: &Identity) -> Result<User, AppError> {
        let user = self.find_or_create(identity).await?;

        let touched = self
            .store
            .touch_user(&identity.login, &identity.avatar_url, Utc::now())
            .await?;

        Ok(touched.unwrap_or(user))
    }
}
