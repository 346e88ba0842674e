use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;
use crate::auth::{password, Principal, Role};
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::user::split_full_name;
use crate::state::SharedState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::BadRequest("Username is required".to_string()));
        }
        if self.username.trim() != self.username {
            return Err(AppError::BadRequest(
                "Username must not start or end with whitespace".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::BadRequest("Valid email is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub roles: Vec<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let username = req.username.as_str();
    if state.users.exists(username) {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let full_name = match req.full_name.trim() {
        "" => username,
        name => name,
    };

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // Second check happens atomically inside the directory.
    let account = state
        .users
        .create(username, &pw_hash, req.email.trim(), full_name, vec![Role::User])?;

    audit::log_event(
        &account.username,
        "user.registered",
        "user",
        Some(&account.username),
        None,
    );

    Ok(Json(RegisterResponse {
        message: "Registration successful".to_string(),
        username: account.username,
        email: account.email,
        full_name: account.full_name,
        role: Role::User,
    }))
}

pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;

    if state.login_limiter.check(&req.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let account = state
        .users
        .authenticate(&req.username, &req.password)
        .map_err(AppError::Internal)?;

    let Some(account) = account else {
        state.login_limiter.record_failure(&req.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };
    state.login_limiter.reset(&account.username);

    let keys = state.identity.keys();
    let claims = Claims::new(
        &account.username,
        &account.email,
        &account.full_name,
        &account.roles,
        keys.ttl_secs,
    );
    let access_token = keys.encode_token(&claims).map_err(AppError::Internal)?;

    audit::log_event(&account.username, "user.login", "user", Some(&account.username), None);

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: keys.ttl_secs,
        username: account.username,
        roles: account.roles,
    }))
}

/// Tokens are stateless; logging out is the client discarding its token.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

pub async fn me(principal: Principal) -> Json<MeResponse> {
    let roles = principal.role_names();
    let (first_name, last_name) = split_full_name(principal.name.as_deref().unwrap_or(""));
    let (first_name, last_name) = (first_name.to_string(), last_name.to_string());

    Json(MeResponse {
        username: principal.username.unwrap_or(principal.id),
        roles,
        email: principal.email,
        first_name,
        last_name,
    })
}
