use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One set of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub reps: u32,
    pub weight: f64,
}

impl Set {
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<Set>,
}

impl Exercise {
    /// Sum of `reps * weight` over all sets, unrounded.
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(Set::volume).sum()
    }
}

/// Workout record as persisted and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub notes: String,
    pub exercises: Vec<Exercise>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
