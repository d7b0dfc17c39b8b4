use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

use super::{
    repo_types::Workout,
    validation::{validate_new, validate_update},
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route(
            "/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

fn workout_not_found() -> AppError {
    AppError::not_found("Workout not found")
}

/// Path ids that are not UUIDs cannot name a stored workout.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| workout_not_found())
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<Vec<Workout>> {
    Json(Workout::list_by_user(&state.store, user.id).await)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_workout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Workout>, AppError> {
    let id = parse_id(&id)?;
    Workout::get_for_user(&state.store, user.id, id)
        .await
        .map(Json)
        .ok_or_else(workout_not_found)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Workout>), AppError> {
    let Json(payload) = payload?;
    let workout = validate_new(&payload, user.id, OffsetDateTime::now_utc()).map_err(|e| {
        warn!(error = %e, "rejected workout payload");
        e
    })?;

    let workout = workout.save(&state.store).await?;
    info!(workout_id = %workout.id, "workout created");
    Ok((StatusCode::CREATED, Json(workout)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_workout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Workout>, AppError> {
    let id = parse_id(&id)?;
    let existing = Workout::get_for_user(&state.store, user.id, id)
        .await
        .ok_or_else(workout_not_found)?;

    let Json(payload) = payload?;
    let updated = validate_update(&payload, &existing, OffsetDateTime::now_utc()).map_err(|e| {
        warn!(error = %e, workout_id = %id, "rejected workout update");
        e
    })?;

    let updated = updated.save(&state.store).await?;
    info!(workout_id = %updated.id, "workout updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if !Workout::delete_for_user(&state.store, user.id, id).await? {
        return Err(workout_not_found());
    }
    info!(workout_id = %id, "workout deleted");
    Ok(StatusCode::NO_CONTENT)
}
