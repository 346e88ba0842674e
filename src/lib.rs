pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::TokenKeys;
use crate::auth::resolver::IdentityResolver;
use crate::config::{AuthMode, Config};
use crate::middleware::access::enforce_access;
use crate::policy::AccessPolicy;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};
use crate::store::{SubmissionStore, UserDirectory};

/// Construct the shared state: key material, user directory and empty stores.
pub fn build_state(config: Config) -> Result<SharedState, String> {
    let keys = TokenKeys::from_config(&config.jwt)?;
    if config.auth == AuthMode::Local && !keys.can_sign() {
        return Err("Local auth mode needs JWT_SECRET to sign tokens".to_string());
    }

    let users = if config.seed_demo_users {
        tracing::info!("Seeding demo users");
        UserDirectory::with_demo_users()?
    } else {
        UserDirectory::new()
    };

    let identity = IdentityResolver::new(config.auth.clone(), keys, config.jwt.client_id.clone());

    Ok(Arc::new(AppState {
        config,
        identity,
        policy: AccessPolicy::standard(),
        users,
        submissions: SubmissionStore::new(),
        login_limiter: LoginRateLimiter::new(),
        started_at: Instant::now(),
    }))
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::system_routes())
        .merge(routes::api_routes(&state.config.auth))
        .fallback(routes::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            enforce_access,
        ))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
