use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as persisted in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                           // unique user ID
    pub name: String,                       // display name
    pub email: String,                      // lower-cased at registration
    #[serde(alias = "passwordHash")]
    pub password_credential: String,        // Argon2 (or legacy bcrypt) hash, never leaves the server
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,         // creation timestamp
}
