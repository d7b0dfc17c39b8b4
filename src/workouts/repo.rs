use uuid::Uuid;

use crate::db::RecordStore;
use crate::workouts::repo_types::Workout;

impl Workout {
    /// Workouts of one user, newest `date` first.
    pub async fn list_by_user(store: &RecordStore, user_id: Uuid) -> Vec<Workout> {
        let mut rows = store.list_workouts(user_id).await;
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows
    }

    pub async fn get_for_user(store: &RecordStore, user_id: Uuid, id: Uuid) -> Option<Workout> {
        store.find_workout(id, user_id).await
    }

    pub async fn save(self, store: &RecordStore) -> anyhow::Result<Workout> {
        store.upsert_workout(self).await
    }

    pub async fn delete_for_user(
        store: &RecordStore,
        user_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<bool> {
        store.delete_workout(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::storage::MemoryBackend;

    fn on(date: time::OffsetDateTime, user_id: Uuid) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            user_id,
            date,
            notes: String::new(),
            exercises: Vec::new(),
            created_at: date,
            updated_at: date,
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = RecordStore::new(Arc::new(MemoryBackend::new()));
        let owner = Uuid::new_v4();
        for date in [
            datetime!(2024-01-08 00:00 UTC),
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-02-01 00:00 UTC),
        ] {
            on(date, owner).save(&store).await.unwrap();
        }

        let dates: Vec<_> = Workout::list_by_user(&store, owner)
            .await
            .into_iter()
            .map(|w| w.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                datetime!(2024-02-01 00:00 UTC),
                datetime!(2024-01-08 00:00 UTC),
                datetime!(2024-01-01 00:00 UTC),
            ]
        );
    }
}
