use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Principal;

#[derive(Serialize)]
pub struct UserInfo {
    pub message: &'static str,
    pub sub: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub email_verified: Option<bool>,
    pub retrieved_at: DateTime<Utc>,
}

pub async fn info(principal: Principal) -> Json<UserInfo> {
    let roles = principal.role_names();
    Json(UserInfo {
        message: "Welcome to the user area!",
        sub: principal.id,
        username: principal.username,
        email: principal.email,
        name: principal.name,
        roles,
        timestamp: Utc::now(),
    })
}

pub async fn profile(principal: Principal) -> Json<UserProfile> {
    Json(UserProfile {
        user_id: principal.id,
        username: principal.username,
        email: principal.email,
        name: principal.name,
        email_verified: principal.email_verified,
        retrieved_at: Utc::now(),
    })
}
