//! # Account model
//!
//! Two representations of a registered user:
//!
//! - [`Account`] is the identity record with id, email, display name and creation time.
//!   The identity service owns it; the application keeps a denormalized mirror of it
//!   under `user:<email>` for lookups.
//! - [`AccountInfo`]: the subset returned to clients (`{id, email, name}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Convert to AccountInfo for client consumption.
    pub fn to_info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Account information safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Canonical form of an email used as the account key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
