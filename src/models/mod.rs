// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod identity;
pub mod user;

pub use identity::Identity;
pub use user::{ApiClient, NewUser, Organisation, User};
