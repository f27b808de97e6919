// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request pipeline stages (panic recovery, authentication, security headers).

pub mod auth;
pub mod panic;
pub mod security;

pub use auth::require_session;
pub use panic::catch_panic;
