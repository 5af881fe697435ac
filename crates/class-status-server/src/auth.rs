//! Bearer-token identity.
//!
//! Token issuance lives outside this service; handlers only need to know which
//! user a presented token belongs to.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use class_status::UserId;

use crate::error::AppError;
use crate::state::AppState;

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<UserId>;
}

/// A fixed token → user table, typically loaded from the seed file.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens(HashMap<String, UserId>);

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, user_id: UserId) {
        self.0.insert(token.into(), user_id);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TokenVerifier for StaticTokens {
    fn verify(&self, token: &str) -> Option<UserId> {
        self.0.get(token).copied()
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        state
            .tokens
            .verify(token)
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
