//! Bearer token issuing and validation, with the reader/writer scope policies.

use crate::config::AuthSettings;
use crate::error::AppError;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const READER_SCOPE: &str = "pet-store-reader";
pub const WRITER_SCOPE: &str = "pet-store-writer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Reader,
    Writer,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Reader => READER_SCOPE,
            Scope::Writer => WRITER_SCOPE,
        }
    }
}

/// `scope` claim: a space separated string or an array of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    Single(String),
    Many(Vec<String>),
}

impl Default for ScopeClaim {
    fn default() -> Self {
        ScopeClaim::Many(Vec::new())
    }
}

impl ScopeClaim {
    pub fn contains(&self, scope: &str) -> bool {
        match self {
            ScopeClaim::Single(s) => s.split_whitespace().any(|s| s == scope),
            ScopeClaim::Many(v) => v.iter().any(|s| s == scope),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub scope: ScopeClaim,
}

pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = match &settings.secret {
            Some(s) => s.as_bytes().to_vec(),
            None => {
                tracing::info!("JWT_SECRET not set; tokens are signed with a per-process secret");
                let mut bytes = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                bytes
            }
        };
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        Authenticator {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            token_ttl: settings.token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Sign a token for `subject` carrying the given scopes.
    pub fn issue(&self, subject: &str, scopes: &[Scope]) -> Result<String, AppError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: now + self.token_ttl.as_secs(),
            iat: now,
            scope: ScopeClaim::Single(scopes.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ")),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Validate the bearer token in `headers`: signature, issuer, audience, expiry.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        let token = bearer_token(headers).ok_or_else(|| {
            debug!("bearer validation failed: missing or malformed Authorization header");
            AppError::Unauthorized("bearer token required".into())
        })?;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = ?e.kind(), "bearer validation failed");
                AppError::Unauthorized("invalid bearer token".into())
            })
    }

    /// Authenticate, then require `scope`. A valid token without the scope is Forbidden.
    pub fn authorize(&self, headers: &HeaderMap, scope: Scope) -> Result<Claims, AppError> {
        let claims = self.authenticate(headers)?;
        if !claims.scope.contains(scope.as_str()) {
            debug!(sub = %claims.sub, required = scope.as_str(), "bearer validation failed: missing scope");
            return Err(AppError::Forbidden(format!("scope {} required", scope.as_str())));
        }
        Ok(claims)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
