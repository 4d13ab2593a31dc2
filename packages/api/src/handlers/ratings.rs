use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, JsonBody};
use crate::aggregate::apply_rating;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::{Category, FieldError, Rating, RatingSubmission, RatingValue, Student};
use crate::records::{load_student, save_student};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub student_id: Option<String>,
    pub rating: Option<i64>,
    pub category: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub success: bool,
    pub student: Student,
}

fn validate(body: RatingRequest) -> Result<(String, RatingSubmission), ApiError> {
    let (Some(student_id), Some(rating), Some(category)) = (
        non_blank(body.student_id),
        body.rating,
        non_blank(body.category),
    ) else {
        return Err(ApiError::Validation(
            "Student, rating and category are required".into(),
        ));
    };

    let submission = RatingSubmission {
        value: RatingValue::try_from(rating).map_err(FieldError::from)?,
        category: category.parse::<Category>().map_err(FieldError::from)?,
        comment: non_blank(body.comment).unwrap_or_default(),
    };
    Ok((student_id, submission))
}

/// Append a rating to a student and return the updated record.
///
/// The read and the write are not atomic: two concurrent ratings of the same
/// student can lose one of them.
pub async fn add_rating(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<RatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    let (student_id, submission) = validate(body)?;

    let not_found = || ApiError::NotFound("Student not found".into());
    let id = Uuid::parse_str(&student_id).map_err(|_| not_found())?;

    let student = load_student(state.store.as_ref(), id)
        .await
        .map_err(|e| ApiError::internal("Failed to add rating", e))?
        .ok_or_else(not_found)?;

    let student = apply_rating(student, Rating::new(submission, user.account.id));
    save_student(state.store.as_ref(), &student)
        .await
        .map_err(|e| ApiError::internal("Failed to add rating", e))?;

    Ok(Json(RatingResponse {
        success: true,
        student,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: Option<i64>, category: Option<&str>) -> RatingRequest {
        RatingRequest {
            student_id: Some(Uuid::nil().to_string()),
            rating,
            category: category.map(str::to_string),
            comment: None,
        }
    }

    #[test]
    fn test_validate_accepts_labels_and_defaults_comment() {
        let (_, submission) = validate(request(Some(3), Some("Technical Skills"))).unwrap();
        assert_eq!(submission.category, Category::Technical);
        assert_eq!(submission.value.get(), 3);
        assert_eq!(submission.comment, "");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        for body in [
            request(None, Some("teamwork")),
            request(Some(4), None),
            request(Some(4), Some("  ")),
            request(Some(0), Some("teamwork")),
            request(Some(6), Some("teamwork")),
            request(Some(4), Some("charisma")),
        ] {
            let err = validate(body).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{err:?}");
        }
    }
}
