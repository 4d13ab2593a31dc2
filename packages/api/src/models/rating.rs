//! Ratings embedded in a student record, and the validated values they carry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What aspect of collaboration a rating scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Teamwork,
    Communication,
    Technical,
    Reliability,
    Leadership,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Teamwork,
        Category::Communication,
        Category::Technical,
        Category::Reliability,
        Category::Leadership,
    ];

    /// Wire name, e.g. `"technical"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Teamwork => "teamwork",
            Category::Communication => "communication",
            Category::Technical => "technical",
            Category::Reliability => "reliability",
            Category::Leadership => "leadership",
        }
    }

    /// Human-readable label shown by clients.
    pub fn label(self) -> &'static str {
        match self {
            Category::Teamwork => "Teamwork",
            Category::Communication => "Communication",
            Category::Technical => "Technical Skills",
            Category::Reliability => "Reliability",
            Category::Leadership => "Leadership",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the wire name or the display label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub i64);

/// A star value in `1..=5`. Out-of-range values cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidRating(value))
        }
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

/// A validated rating request, before it is stamped with an id and author.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSubmission {
    pub value: RatingValue,
    pub category: Category,
    pub comment: String,
}

/// One immutable rating of a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    #[serde(rename = "rating")]
    pub value: RatingValue,
    pub category: Category,
    #[serde(default)]
    pub comment: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Stamp a submission with a fresh id, its author and the current time.
    pub fn new(submission: RatingSubmission, author: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: submission.value,
            category: submission.category,
            comment: submission.comment,
            user_id: author,
            created_at: Utc::now(),
        }
    }
}
