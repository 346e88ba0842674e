pub mod admin;
pub mod assessments;
pub mod auth;
pub mod system;
pub mod user;

use axum::routing::{get, post};
use axum::Router;

use crate::config::AuthMode;
use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes(mode: &AuthMode) -> Router<SharedState> {
    let router = Router::new()
        // Auth
        .route("/api/auth/me", get(auth::me))
        // User area
        .route("/api/user", get(user::info))
        .route("/api/user/profile", get(user::profile))
        // Admin area
        .route("/api/admin", get(admin::info))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/stats", get(admin::stats))
        // Assessments
        .route("/api/submit-assessment", post(assessments::submit))
        .route("/api/my-assessments", get(assessments::mine))
        .route("/api/assessments", get(assessments::list))
        .route(
            "/api/assessment/{id}",
            get(assessments::get).delete(assessments::delete),
        )
        .route("/api/assessment-stats", get(assessments::stats));

    // Accounts are only managed here when this service is its own issuer.
    match mode {
        AuthMode::Local => router
            .route("/api/auth/register", post(auth::register))
            .route("/api/auth/login", post(auth::login))
            .route("/api/auth/logout", post(auth::logout)),
        AuthMode::External => router,
    }
}

pub fn system_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(system::welcome))
        .route("/health", get(system::health))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}
