use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::seed::{seed_demo_data, SeedOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}

/// Populate an empty installation with demo students.
pub async fn init_demo(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SeedResponse>, ApiError> {
    let outcome = seed_demo_data(state.store.as_ref(), user.account.id)
        .await
        .map_err(|e| ApiError::internal("Failed to create demo data", e))?;

    let message = match outcome {
        SeedOutcome::AlreadySeeded => "Demo data already exists",
        SeedOutcome::Inserted(_) => "Demo data created",
    };
    Ok(Json(SeedResponse {
        message: message.to_string(),
        count: outcome.count(),
    }))
}
