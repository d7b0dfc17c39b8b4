use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, JwtKeys, LoginRequest, PublicUser, RegisterRequest},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo_types::User,
        services::is_valid_email,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn required(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    // Passwords are taken verbatim; only presence is checked.
    let password = payload.password.filter(|p| !p.is_empty());
    let (Some(name), Some(email), Some(password)) =
        (required(payload.name), required(payload.email), password)
    else {
        return Err(AppError::BadRequest(
            "Name, email, and password are required".into(),
        ));
    };
    let email = email.to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if User::find_by_email(&state.store, &email).await.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.store, &name, &email, &hash).await?;

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    let password = payload.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (required(payload.email), password) else {
        return Err(AppError::BadRequest(
            "Email and password are required".into(),
        ));
    };

    // Unknown account and wrong password answer identically.
    let Some(user) = User::find_by_email(&state.store, &email).await else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    match verify_password(&password, &user.password_credential) {
        Ok(true) => {}
        Ok(false) => {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AppError::unauthorized("Invalid credentials"));
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "stored credential unusable");
            return Err(AppError::unauthorized("Invalid credentials"));
        }
    }

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user)
}
