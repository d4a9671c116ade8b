//! Authentication middleware for order routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use identity::{IdentityError, IdentityProvider, bearer_token};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<dyn IdentityProvider>,
}

/// Rejects requests without a valid bearer token and stores the verified
/// [`identity::Identity`] in the request extensions.
pub async fn require_identity(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| IdentityError::MalformedToken))
        .transpose()?;

    let token = bearer_token(header)?;
    let identity = state.identity.verify(token).inspect_err(|err| {
        tracing::warn!(error = %err, "rejected caller");
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
