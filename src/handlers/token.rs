//! Token issuing for benchmark clients.

use crate::auth::Scope;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// User that also receives the writer scope.
pub const WRITER_USER: &str = "writer";

#[derive(Deserialize)]
pub struct TokenQuery {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub token: String,
    pub expires_in: u64,
}

pub async fn issue_token(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<TokenBody>, AppError> {
    let username = q
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("username is required".into()))?;
    let scopes: &[Scope] = if username == WRITER_USER {
        &[Scope::Reader, Scope::Writer]
    } else {
        &[Scope::Reader]
    };
    let token = state.auth.issue(&username, scopes)?;
    tracing::info!(user = %username, writer = scopes.len() > 1, "token issued");
    Ok(Json(TokenBody {
        token,
        expires_in: state.auth.token_ttl().as_secs(),
    }))
}
