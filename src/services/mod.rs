// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod directory;
pub mod github;
pub mod session;

pub use directory::UserDirectory;
pub use github::{GitHubClient, IdentityProvider};
pub use session::{AuthUser, SessionCache, SessionResolver};
