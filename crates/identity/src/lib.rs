//! Caller identity for the lab order backend.
//!
//! Orders are only reachable by authenticated callers. This crate turns an
//! `Authorization` header into a verified [`Identity`]; how credentials are
//! checked and tokens issued is up to whoever signs the tokens.

mod jwt;

pub use jwt::{JwtIdentityProvider, TokenClaims};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Reasons a caller is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Token not provided")]
    MissingToken,

    #[error("Token malformatted")]
    MalformedToken,

    #[error("Invalid token")]
    InvalidToken,
}

/// Source of verified caller identities.
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and returns the identity it carries.
    fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, IdentityError> {
    let header = header.ok_or(IdentityError::MissingToken)?;

    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(IdentityError::MalformedToken)?;
    let token = parts.next().ok_or(IdentityError::MalformedToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return Err(IdentityError::MalformedToken);
    }

    Ok(token)
}
