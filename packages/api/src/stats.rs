//! Aggregate figures for the dashboard.

use serde::{Deserialize, Serialize};

use crate::models::Student;

/// Students at or above this average count as top rated.
pub const TOP_STUDENT_THRESHOLD: f64 = 4.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_students: usize,
    pub total_reviews: u64,
    /// Mean of the per-student averages, unweighted.
    pub average_rating: f64,
    pub top_students: usize,
}

pub fn summarize(students: &[Student]) -> Stats {
    let total_reviews = students.iter().map(|s| u64::from(s.total_reviews())).sum();
    let average_rating = if students.is_empty() {
        0.0
    } else {
        students.iter().map(Student::average_rating).sum::<f64>() / students.len() as f64
    };
    let top_students = students
        .iter()
        .filter(|s| s.average_rating() >= TOP_STUDENT_THRESHOLD)
        .count();

    Stats {
        total_students: students.len(),
        total_reviews,
        average_rating,
        top_students,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_students;
    use uuid::Uuid;

    #[test]
    fn test_empty() {
        assert_eq!(
            summarize(&[]),
            Stats {
                total_students: 0,
                total_reviews: 0,
                average_rating: 0.0,
                top_students: 0,
            }
        );
    }

    #[test]
    fn test_demo_data() {
        let stats = summarize(&demo_students(Uuid::nil()).unwrap());
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_reviews, 5);
        assert_eq!(stats.top_students, 2);
        assert!((stats.average_rating - 4.5).abs() < 1e-9);
    }
}
