pub mod assignments;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod projects;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::json;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/change-password", post(auth::change_password))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Projects
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        // Assignments
        .route(
            "/api/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route(
            "/api/assignments/capacity/{user_id}",
            get(assignments::user_capacity),
        )
        .route(
            "/api/assignments/{id}",
            get(assignments::get)
                .put(assignments::update)
                .delete(assignments::delete),
        )
        // Dashboard
        .route("/api/dashboard/analytics", get(dashboard::analytics))
        .route("/api/dashboard/workload", get(dashboard::workload))
        // Audit
        .route("/api/audit", get(audit::list))
        .fallback(not_found)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(json!({
        "status": "OK",
        "message": "Engineering Resource Management API is running!",
    }))
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}
