//! Workout records and mutation results

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::StorageError;
use crate::exercises::Exercise;

/// Opaque workout id, the creation time in milliseconds rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Numeric value, if the id was generated from a timestamp
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named, user-created list of exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Outcome of a save request that passed validation
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(Committed<Workout>),
    /// Another workout already uses this name (case-insensitive).
    /// Nothing was written; call `confirm_replace` once the user agrees.
    NameConflict { existing: WorkoutId, name: String },
}

/// A mutation applied in memory. `storage_error` is set when writing it
/// to storage failed; the in-session change stays in place either way.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    pub storage_error: Option<StorageError>,
}

impl<T> Committed<T> {
    pub(crate) fn new(value: T, writes: impl IntoIterator<Item = Result<(), StorageError>>) -> Self {
        let mut storage_error = None;
        for result in writes {
            if let Err(e) = result {
                warn!("Failed to persist change: {}", e);
                storage_error.get_or_insert(e);
            }
        }
        Self { value, storage_error }
    }

    pub(crate) fn in_memory(value: T) -> Self {
        Self { value, storage_error: None }
    }

    pub fn is_durable(&self) -> bool {
        self.storage_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            storage_error: self.storage_error,
        }
    }
}
