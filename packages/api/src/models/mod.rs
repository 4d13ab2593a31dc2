//! Data models for accounts, students and ratings.

mod account;
mod rating;
mod student;

pub use account::{normalize_email, Account, AccountInfo};
pub use rating::{
    Category, InvalidRating, Rating, RatingSubmission, RatingValue, UnknownCategory,
};
pub use student::{NewStudent, Student};

/// Field-level validation failure for client input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error(transparent)]
    Rating(#[from] InvalidRating),

    #[error(transparent)]
    Category(#[from] UnknownCategory),
}
