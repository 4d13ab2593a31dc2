//! HTTP handlers.
//!
//! Handlers stay thin: authenticate through [`CurrentUser`](crate::auth::CurrentUser),
//! validate the body into typed values, call the domain code, and read or write the
//! record store. Request bodies use optional fields so that a missing field gets a
//! descriptive 400 rather than a deserializer message.

pub mod account;
pub mod demo;
pub mod ratings;
pub mod students;

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;

/// `Json<T>` whose rejection is a 400 in the service's error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Trimmed value of an optional text field, `None` when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
