use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{dto::JwtKeys, dto::PublicUser, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Caller identity resolved from a bearer token against the record store.
///
/// Only `{id, name, email}` is exposed downstream.
pub struct AuthUser(pub PublicUser);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            warn!("authentication token missing");
            AppError::unauthorized("Authentication token missing")
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthorized("Invalid or expired token")
        })?;

        // The token may outlive the account it was issued for.
        let user = User::find_by_id(&state.store, claims.sub)
            .await
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                AppError::unauthorized("User not found")
            })?;

        Ok(AuthUser(PublicUser::from(user)))
    }
}
