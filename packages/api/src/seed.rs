//! Demo data for an empty installation.

use chrono::Utc;
use store::{RecordStore, StoreError};
use uuid::Uuid;

use crate::aggregate::apply_rating;
use crate::models::{
    Category, FieldError, NewStudent, Rating, RatingSubmission, RatingValue, Student,
};
use crate::records::{any_students, save_student};

/// Result of [`seed_demo_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Students already existed; nothing was written.
    AlreadySeeded,
    Inserted(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid demo record: {0}")]
    Demo(#[from] FieldError),
}

impl SeedOutcome {
    pub fn count(self) -> usize {
        match self {
            SeedOutcome::AlreadySeeded => 0,
            SeedOutcome::Inserted(n) => n,
        }
    }
}

type DemoRating = (i64, Category, &'static str);

const DEMO: &[(&str, &str, &str, &[DemoRating])] = &[
    (
        "Alexander Ivanov",
        "Computer Science",
        "Senior",
        &[
            (5, Category::Teamwork, "Great team player!"),
            (4, Category::Technical, "Solid knowledge"),
        ],
    ),
    (
        "Maria Petrova",
        "Data Science",
        "Junior",
        &[
            (5, Category::Communication, "Always reachable"),
            (5, Category::Reliability, "You can count on her"),
        ],
    ),
    (
        "Dmitry Sokolov",
        "Software Engineering",
        "Senior",
        &[(4, Category::Leadership, "Good project lead")],
    ),
];

/// The illustrative students, with ratings authored by `creator`.
pub fn demo_students(creator: Uuid) -> Result<Vec<Student>, FieldError> {
    let created_at = Utc::now();
    DEMO.iter()
        .map(|(name, major, year, ratings)| -> Result<Student, FieldError> {
            let mut student = Student::create(NewStudent::new(name, major, year)?, creator);
            student.created_at = created_at;
            for (value, category, comment) in ratings.iter() {
                let submission = RatingSubmission {
                    value: RatingValue::try_from(*value)?,
                    category: *category,
                    comment: comment.to_string(),
                };
                student = apply_rating(student, Rating::new(submission, creator));
            }
            Ok(student)
        })
        .collect()
}

/// Insert the demo students unless any student exists already.
pub async fn seed_demo_data(store: &dyn RecordStore, creator: Uuid) -> Result<SeedOutcome, SeedError> {
    if any_students(store).await? {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let students = demo_students(creator)?;
    for student in &students {
        save_student(store, student).await?;
    }
    tracing::info!(count = students.len(), "seeded demo students");
    Ok(SeedOutcome::Inserted(students.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::list_students;
    use store::MemoryStore;

    #[test]
    fn test_demo_averages_follow_ratings() {
        let students = demo_students(Uuid::nil()).unwrap();
        let summary: Vec<_> = students
            .iter()
            .map(|s| (s.name.as_str(), s.average_rating(), s.total_reviews()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Alexander Ivanov", 4.5, 2),
                ("Maria Petrova", 5.0, 2),
                ("Dmitry Sokolov", 4.0, 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = MemoryStore::new();
        let creator = Uuid::new_v4();

        assert_eq!(
            seed_demo_data(&store, creator).await.unwrap(),
            SeedOutcome::Inserted(3)
        );
        let first = list_students(&store).await.unwrap();

        let second = seed_demo_data(&store, creator).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadySeeded);
        assert_eq!(second.count(), 0);
        assert_eq!(list_students(&store).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_existing_student_blocks_seeding() {
        let store = MemoryStore::new();
        let student = Student::create(NewStudent::new("Ann", "CS", "Freshman").unwrap(), Uuid::nil());
        save_student(&store, &student).await.unwrap();

        assert_eq!(
            seed_demo_data(&store, Uuid::nil()).await.unwrap(),
            SeedOutcome::AlreadySeeded
        );
        assert_eq!(store.len(), 1);
    }
}
