//! Record store over a single persisted collection of users and workouts.
//!
//! Every call loads the whole collection from the backend, works on an
//! in-memory copy and, for mutations, writes the whole collection back.
//! Calls are not coordinated with each other: two concurrent mutations race
//! and the later write wins, dropping the earlier change.

use std::sync::Arc;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{auth::repo_types::User, storage::StorageBackend, workouts::repo_types::Workout};

/// Everything the service persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

/// Why a persisted collection could not be used as-is.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("persisted collection is unreadable: {0:#}")]
    Unreadable(anyhow::Error),
    #[error("persisted collection is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Strict read of the persisted collection.
    ///
    /// Nothing persisted yet is an empty collection. A section that does not
    /// decode loses only its undecodable records, each logged.
    pub async fn read_collection(&self) -> Result<Collection, StorageError> {
        let Some(bytes) = self.backend.read().await.map_err(StorageError::Unreadable)? else {
            return Ok(Collection::default());
        };
        let doc: Value = serde_json::from_slice(&bytes)?;
        Ok(Collection {
            users: section(&doc, "users"),
            workouts: section(&doc, "workouts"),
        })
    }

    /// Loads the collection, resetting to empty when it cannot be read.
    ///
    /// The reset loses whatever was stored; it is logged at `error` so
    /// operators see it.
    pub async fn load(&self) -> Collection {
        match self.read_collection().await {
            Ok(collection) => collection,
            Err(e) => {
                error!(error = %e, "storage corruption; resetting to an empty collection");
                Collection::default()
            }
        }
    }

    async fn persist(&self, collection: &Collection) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(collection).context("encode collection")?;
        self.backend.write(body).await.context("persist collection")?;
        debug!(
            users = collection.users.len(),
            workouts = collection.workouts.len(),
            "collection persisted"
        );
        Ok(())
    }

    /// Case-insensitive exact match on email.
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let wanted = email.to_lowercase();
        self.load()
            .await
            .users
            .into_iter()
            .find(|u| u.email.to_lowercase() == wanted)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Option<User> {
        self.load().await.users.into_iter().find(|u| u.id == id)
    }

    /// Appends the user. Email uniqueness is not enforced here.
    pub async fn create_user(&self, user: User) -> anyhow::Result<User> {
        let mut collection = self.load().await;
        collection.users.push(user.clone());
        self.persist(&collection).await?;
        Ok(user)
    }

    /// Workouts owned by `user_id`, in stored order.
    pub async fn list_workouts(&self, user_id: Uuid) -> Vec<Workout> {
        self.load()
            .await
            .workouts
            .into_iter()
            .filter(|w| w.user_id == user_id)
            .collect()
    }

    /// A single workout, visible only to its owner.
    pub async fn find_workout(&self, id: Uuid, user_id: Uuid) -> Option<Workout> {
        self.load()
            .await
            .workouts
            .into_iter()
            .find(|w| w.id == id && w.user_id == user_id)
    }

    /// Replaces the workout with the same id in place, or appends it.
    pub async fn upsert_workout(&self, workout: Workout) -> anyhow::Result<Workout> {
        let mut collection = self.load().await;
        match collection.workouts.iter_mut().find(|w| w.id == workout.id) {
            Some(slot) => *slot = workout.clone(),
            None => collection.workouts.push(workout.clone()),
        }
        self.persist(&collection).await?;
        Ok(workout)
    }

    /// Removes the workout only when both id and owner match.
    pub async fn delete_workout(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let mut collection = self.load().await;
        let before = collection.workouts.len();
        collection
            .workouts
            .retain(|w| !(w.id == id && w.user_id == user_id));
        let deleted = collection.workouts.len() != before;
        if deleted {
            self.persist(&collection).await?;
        }
        Ok(deleted)
    }
}

/// Decodes one section record by record. A record that does not decode is
/// dropped and logged; the rest of the section survives. A section that is
/// not a list at all resets to empty.
fn section<T: DeserializeOwned>(doc: &Value, key: &str) -> Vec<T> {
    let Some(raw) = doc.get(key) else {
        return Vec::new();
    };
    let Some(items) = raw.as_array() else {
        error!(
            section = key,
            "storage corruption: section is not a list; resetting it to empty"
        );
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                error!(
                    section = key,
                    position,
                    error = %e,
                    "storage corruption: dropping undecodable record"
                );
                None
            }
        })
        .collect()
}
