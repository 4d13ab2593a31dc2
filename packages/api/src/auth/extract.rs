//! Request authentication.
//!
//! Protected handlers take a [`CurrentUser`] argument. Extraction reads
//! `Authorization: Bearer <token>`, refuses the public anonymous key, and asks the
//! identity service to resolve the token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::identity::IdentityError;
use crate::error::ApiError;
use crate::models::Account;
use crate::state::AppState;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub account: Account,
    pub token: String,
}

/// The token of a `Bearer` authorization header, if there is one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::Unauthorized("Authorization required".into()));
        };

        if state.auth.is_anonymous_key(token) {
            tracing::warn!(path = %parts.uri.path(), "request authenticated with the anonymous key");
            return Err(ApiError::Unauthorized("Authorization required".into()));
        }

        match state.identity.verify_token(token).await {
            Ok(account) => Ok(Self {
                account,
                token: token.to_string(),
            }),
            Err(IdentityError::InvalidToken) => {
                Err(ApiError::Unauthorized("Invalid authorization token".into()))
            }
            Err(e) => Err(ApiError::internal("Failed to verify authorization token", e)),
        }
    }
}
