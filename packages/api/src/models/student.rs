//! # Student record
//!
//! A [`Student`] is created once through [`Student::create`] and afterwards only
//! changes by appending ratings (see [`crate::aggregate::apply_rating`]). The
//! derived `averageRating` and `totalReviews` fields are stored alongside the
//! ratings so clients can render lists without recomputing them. They are
//! crate-private: only the aggregation code writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rating::Rating;
use super::FieldError;

/// Validated input for a new student: every field is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    name: String,
    major: String,
    year: String,
}

impl NewStudent {
    pub fn new(name: &str, major: &str, year: &str) -> Result<Self, FieldError> {
        Ok(Self {
            name: required("name", name)?,
            major: required("major", major)?,
            year: required("year", year)?,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Missing { field });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub major: String,
    pub year: String,
    #[serde(default)]
    pub(crate) ratings: Vec<Rating>,
    #[serde(default)]
    pub(crate) average_rating: f64,
    #[serde(default)]
    pub(crate) total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl Student {
    /// Create a student with no ratings and a fresh id.
    pub fn create(new: NewStudent, creator: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            major: new.major,
            year: new.year,
            ratings: Vec::new(),
            average_rating: 0.0,
            total_reviews: 0,
            created_at: Utc::now(),
            created_by: creator,
        }
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn average_rating(&self) -> f64 {
        self.average_rating
    }

    pub fn total_reviews(&self) -> u32 {
        self.total_reviews
    }

    /// Case-insensitive substring match on name or major.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.major.to_lowercase().contains(&query)
    }
}
