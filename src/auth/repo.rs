use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::db::RecordStore;

impl User {
    /// Find a user by email, ignoring case.
    pub async fn find_by_email(store: &RecordStore, email: &str) -> Option<User> {
        store.find_user_by_email(email).await
    }

    pub async fn find_by_id(store: &RecordStore, id: Uuid) -> Option<User> {
        store.find_user_by_id(id).await
    }

    /// Create a new user with an already hashed password.
    ///
    /// Email uniqueness is the caller's job.
    pub async fn create(
        store: &RecordStore,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_credential: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        store.create_user(user).await
    }
}
