//! REST API routes

pub mod dto;
pub mod error;
mod pull_requests;
mod teams;
mod users;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use roster_core::ReviewService;
use serde_json::{json, Value};

pub use error::ApiErr;

/// Shared state for the axum routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(teams::add_team))
        .route("/team/get", get(teams::get_team))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_requests::create))
        .route("/pullRequest/merge", post(pull_requests::merge))
        .route("/pullRequest/reassign", post(pull_requests::reassign))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
