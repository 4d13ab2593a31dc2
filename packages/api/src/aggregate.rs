//! # Rating aggregation
//!
//! [`apply_rating`] is the single place where a student's derived fields change.
//! It appends the rating and recomputes both derived values from the full rating
//! sequence, so `averageRating` and `totalReviews` can never drift from the ratings
//! they summarise.

use crate::models::{Rating, Student};

/// Arithmetic mean of the rating values, or 0 for no ratings.
pub fn mean(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(r.value.get())).sum();
    f64::from(sum) / ratings.len() as f64
}

/// Append `rating` to `student` and recompute the derived fields.
pub fn apply_rating(mut student: Student, rating: Rating) -> Student {
    student.ratings.push(rating);
    student.total_reviews = student.ratings.len() as u32;
    student.average_rating = mean(&student.ratings);
    student
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewStudent, RatingSubmission, RatingValue};
    use uuid::Uuid;

    fn student() -> Student {
        Student::create(
            NewStudent::new("Alexander Ivanov", "Computer Science", "Senior").unwrap(),
            Uuid::new_v4(),
        )
    }

    fn rating(value: i64) -> Rating {
        Rating::new(
            RatingSubmission {
                value: RatingValue::try_from(value).unwrap(),
                category: Category::Teamwork,
                comment: String::new(),
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_worked_example() {
        let s = student();
        assert_eq!(s.average_rating(), 0.0);
        assert_eq!(s.total_reviews(), 0);

        let s = apply_rating(s, rating(4));
        assert_eq!(s.average_rating(), 4.0);
        assert_eq!(s.total_reviews(), 1);

        let s = apply_rating(s, rating(5));
        assert_eq!(s.average_rating(), 4.5);
        assert_eq!(s.total_reviews(), 2);
    }

    #[test]
    fn test_every_append_keeps_invariants() {
        let values = [3, 1, 5, 5, 2, 4, 1, 3, 5, 4, 2, 2];
        let mut s = student();
        for (i, &v) in values.iter().enumerate() {
            let before = s.total_reviews();
            s = apply_rating(s, rating(v));

            assert_eq!(s.total_reviews(), before + 1);
            let seen = &values[..=i];
            let expected = seen.iter().sum::<i64>() as f64 / seen.len() as f64;
            assert!((s.average_rating() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_append_preserves_order_and_ids() {
        let first = rating(1);
        let second = rating(2);
        let s = apply_rating(apply_rating(student(), first.clone()), second.clone());
        assert_eq!(s.ratings(), &[first, second]);
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
