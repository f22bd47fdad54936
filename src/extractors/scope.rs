//! Scope policies as extractors. Put them first in a handler's arguments so the
//! token is checked before the path, query or body is looked at.

use crate::auth::{Claims, Scope};
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Caller holds `pet-store-reader`.
#[derive(Clone, Debug)]
pub struct ReaderAccess(pub Claims);

/// Caller holds `pet-store-writer`.
#[derive(Clone, Debug)]
pub struct WriterAccess(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for ReaderAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.auth.authorize(&parts.headers, Scope::Reader).map(ReaderAccess)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for WriterAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.auth.authorize(&parts.headers, Scope::Writer).map(WriterAccess)
    }
}
