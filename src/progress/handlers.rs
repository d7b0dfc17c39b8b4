use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use super::{dto::ProgressResponse, services::aggregate};
use crate::{auth::extractors::AuthUser, state::AppState};

pub fn progress_routes() -> Router<AppState> {
    Router::new().route("/progress", get(get_progress))
}

/// Recomputed from the caller's full workout set on every request.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_progress(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<ProgressResponse> {
    let workouts = state.store.list_workouts(user.id).await;
    let progress = aggregate(&workouts);
    debug!(
        workouts = workouts.len(),
        exercises = progress.exercises.len(),
        "progress aggregated"
    );
    Json(progress)
}
