use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, JsonBody};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::{NewStudent, Student};
use crate::records::{list_students as load_students, load_student, save_student};
use crate::state::AppState;
use crate::stats::{summarize, Stats};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentList {
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize)]
pub struct StudentBody {
    pub student: Student,
}

/// All students, optionally filtered by a name/major search.
pub async fn list_students(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<StudentList>, ApiError> {
    let mut students = load_students(state.store.as_ref())
        .await
        .map_err(|e| ApiError::internal("Failed to load students", e))?;

    if let Some(search) = non_blank(query.search) {
        students.retain(|s| s.matches(&search));
    }

    Ok(Json(StudentList { students }))
}

pub async fn get_student(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<StudentBody>, ApiError> {
    let not_found = || ApiError::NotFound("Student not found".into());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let student = load_student(state.store.as_ref(), id)
        .await
        .map_err(|e| ApiError::internal("Failed to load student", e))?
        .ok_or_else(not_found)?;

    Ok(Json(StudentBody { student }))
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
}

/// Add a student owned by the caller.
pub async fn create_student(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateStudentRequest>,
) -> Result<Json<StudentBody>, ApiError> {
    let new = NewStudent::new(
        body.name.as_deref().unwrap_or_default(),
        body.major.as_deref().unwrap_or_default(),
        body.year.as_deref().unwrap_or_default(),
    )?;
    let student = Student::create(new, user.account.id);

    save_student(state.store.as_ref(), &student)
        .await
        .map_err(|e| ApiError::internal("Failed to create student", e))?;

    tracing::info!(student_id = %student.id, created_by = %user.account.id, "student created");
    Ok(Json(StudentBody { student }))
}

/// Dashboard figures across all students.
pub async fn stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Stats>, ApiError> {
    let students = load_students(state.store.as_ref())
        .await
        .map_err(|e| ApiError::internal("Failed to load statistics", e))?;
    Ok(Json(summarize(&students)))
}
