//! GainzKeeper: workout logging and training-volume progress API.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod progress;
pub mod state;
pub mod storage;
pub mod workouts;
