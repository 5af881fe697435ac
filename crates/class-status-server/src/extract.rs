//! Extractor wrapper that reports rejections as [`AppError`].
//!
//! axum's own `Json`, `Query`, `Path` and body extractors reject with plain
//! text. Wrapping them in [`Api`] routes the rejection through `AppError`, so
//! every failure leaves the server as a `{"code", "message"}` body.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;

use crate::error::AppError;

/// Runs the inner extractor `E` and converts its rejection into [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Api<E>(pub E);

impl<S, E> FromRequest<S> for Api<E>
where
    S: Send + Sync,
    E: FromRequest<S>,
    AppError: From<E::Rejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(E::from_request(req, state).await?))
    }
}

impl<S, E> FromRequestParts<S> for Api<E>
where
    S: Send + Sync,
    E: FromRequestParts<S>,
    AppError: From<E::Rejection>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(E::from_request_parts(parts, state).await?))
    }
}
