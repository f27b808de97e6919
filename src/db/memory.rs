// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User};

/// User store backed by a concurrent map keyed by GitHub login.
///
/// The map entry for a login is locked while a user is inserted, so two
/// concurrent first logins cannot both create a record.
#[derive(Clone)]
pub struct MemoryDb {
    users: Arc<DashMap<String, User>>,
    next_id: Arc<AtomicU64>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::with_first_id(1)
    }
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the id sequence at `first_id`.
    pub fn with_first_id(first_id: u64) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(first_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn user_exists(&self, login: &str) -> Result<bool, StoreError> {
        Ok(self.users.contains_key(login))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        match self.users.entry(user.github_user_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(user.github_user_id)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let created = user.into_user(id);
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(login).map(|u| u.clone()))
    }

    async fn get_user_id(&self, login: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.users.get(login).map(|u| u.id))
    }

    async fn touch_user(
        &self,
        login: &str,
        avatar: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self.users.get_mut(login).map(|mut user| {
            user.updated = now;
            if !avatar.is_empty() {
                user.avatar = avatar.to_string();
            }
            user.clone()
        }))
    }
}
