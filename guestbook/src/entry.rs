//! Guestbook entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted name, in characters
pub const MAX_NAME_CHARS: usize = 100;

/// Longest accepted message, in characters
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// A stored guestbook entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Random identifier, also the DynamoDB partition key
    pub id: Uuid,
    /// Who signed
    pub name: String,
    /// What they wrote
    pub message: String,
    /// When the entry was accepted
    pub created_at: DateTime<Utc>,
}

/// Form payload of `POST /submit`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    /// `name` form field
    #[serde(default)]
    pub name: String,
    /// `message` form field
    #[serde(default)]
    pub message: String,
}

/// Reasons a submission is refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Blank after trimming
    #[error("{field} must not be empty")]
    Empty {
        /// offending form field
        field: &'static str,
    },
    /// Over the length cap
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// offending form field
        field: &'static str,
        /// the cap
        max: usize,
    },
}

impl NewEntry {
    /// Validates the submission and turns it into an [`Entry`] created at `now`
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<Entry, ValidationError> {
        let name = checked("name", &self.name, MAX_NAME_CHARS)?;
        let message = checked("message", &self.message, MAX_MESSAGE_CHARS)?;
        Ok(Entry {
            id: Uuid::new_v4(),
            name,
            message,
            created_at: now,
        })
    }
}

fn checked(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value.to_string())
}

/// Orders entries newest first, breaking timestamp ties by id so the order
/// does not depend on how the store returned them.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
