use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{non_blank, JsonBody};
use crate::auth::{CurrentUser, IdentityError};
use crate::error::ApiError;
use crate::models::{normalize_email, AccountInfo};
use crate::records::{load_account_mirror, save_account_mirror};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user: AccountInfo,
}

/// Register a new account.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let (Some(email), Some(password), Some(name)) = (
        non_blank(body.email),
        body.password.filter(|p| !p.is_empty()),
        non_blank(body.name),
    ) else {
        return Err(ApiError::Validation(
            "Email, password and name are required".into(),
        ));
    };

    let email = normalize_email(&email);
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".into()));
    }

    let existing = load_account_mirror(state.store.as_ref(), &email)
        .await
        .map_err(|e| ApiError::internal("Registration failed", e))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let account = match state.identity.create_account(&email, &password, &name).await {
        Ok(account) => account,
        Err(IdentityError::DuplicateEmail) => {
            return Err(ApiError::Conflict(
                "An account with this email already exists".into(),
            ))
        }
        Err(e @ IdentityError::WeakPassword) => return Err(ApiError::Validation(e.to_string())),
        Err(e) => return Err(ApiError::internal("Registration failed", e)),
    };

    save_account_mirror(state.store.as_ref(), &account)
        .await
        .map_err(|e| ApiError::internal("Registration failed", e))?;

    Ok(Json(SignupResponse {
        success: true,
        user: account.to_info(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AccountInfo,
}

/// Log in with email and password, receiving a bearer token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (non_blank(body.email), body.password) else {
        return Err(ApiError::Validation("Email and password are required".into()));
    };

    match state.identity.sign_in(&email, &password).await {
        Ok(signed_in) => Ok(Json(LoginResponse {
            access_token: signed_in.token,
            expires_at: signed_in.expires_at,
            user: signed_in.account.to_info(),
        })),
        Err(IdentityError::InvalidCredentials) => {
            Err(ApiError::Unauthorized("Invalid email or password".into()))
        }
        Err(e) => Err(ApiError::internal("Login failed", e)),
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Invalidate the caller's token.
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<LogoutResponse>, ApiError> {
    state
        .identity
        .sign_out(&user.token)
        .await
        .map_err(|e| ApiError::internal("Logout failed", e))?;
    Ok(Json(LogoutResponse { success: true }))
}
