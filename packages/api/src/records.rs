//! Typed access to the application's namespaces in the record store.
//!
//! | Key | Value |
//! |-----|-------|
//! | `student:<uuid>` | [`Student`] |
//! | `user:<email>` | [`Account`] mirror of the identity record |

use store::record::{get_json, scan_json, set_json};
use store::{RecordStore, StoreError};
use uuid::Uuid;

use crate::models::{Account, Student};

pub const STUDENT_PREFIX: &str = "student:";
pub const USER_PREFIX: &str = "user:";

pub fn student_key(id: Uuid) -> String {
    format!("{STUDENT_PREFIX}{id}")
}

pub fn user_key(email: &str) -> String {
    format!("{USER_PREFIX}{email}")
}

pub async fn load_student(store: &dyn RecordStore, id: Uuid) -> Result<Option<Student>, StoreError> {
    get_json(store, &student_key(id)).await
}

pub async fn save_student(store: &dyn RecordStore, student: &Student) -> Result<(), StoreError> {
    set_json(store, &student_key(student.id), student).await
}

/// All students, oldest first; ties broken by name.
pub async fn list_students(store: &dyn RecordStore) -> Result<Vec<Student>, StoreError> {
    let mut students: Vec<Student> = scan_json(store, STUDENT_PREFIX).await?;
    students.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(students)
}

pub async fn any_students(store: &dyn RecordStore) -> Result<bool, StoreError> {
    Ok(!store.scan_prefix(STUDENT_PREFIX).await?.is_empty())
}

pub async fn load_account_mirror(
    store: &dyn RecordStore,
    email: &str,
) -> Result<Option<Account>, StoreError> {
    get_json(store, &user_key(email)).await
}

pub async fn save_account_mirror(store: &dyn RecordStore, account: &Account) -> Result<(), StoreError> {
    set_json(store, &user_key(&account.email), account).await
}
