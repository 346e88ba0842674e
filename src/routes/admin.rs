use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{Principal, Role};
use crate::config::AuthMode;
use crate::models::UserAccount;
use crate::state::SharedState;

const ADMIN_PERMISSIONS: [&str; 4] = ["READ_USERS", "WRITE_USERS", "DELETE_USERS", "MANAGE_SYSTEM"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub message: &'static str,
    pub admin_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<&'static str>,
    pub total_assessments: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct UserList {
    pub users: Vec<UserAccount>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_users: usize,
    pub admin_users: usize,
    pub total_assessments: usize,
    pub uptime_seconds: u64,
    pub auth_mode: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn info(principal: Principal, State(state): State<SharedState>) -> Json<AdminInfo> {
    let roles = principal.role_names();
    Json(AdminInfo {
        message: "Welcome to the admin panel!",
        admin_id: principal.id,
        username: principal.username,
        email: principal.email,
        roles,
        permissions: ADMIN_PERMISSIONS.to_vec(),
        total_assessments: state.submissions.len(),
        timestamp: Utc::now(),
    })
}

pub async fn list_users(State(state): State<SharedState>) -> Json<UserList> {
    let users = state.users.list();
    Json(UserList {
        total: users.len(),
        users,
        timestamp: Utc::now(),
    })
}

pub async fn stats(State(state): State<SharedState>) -> Json<SystemStats> {
    let auth_mode = match state.identity.mode() {
        AuthMode::Local => "local",
        AuthMode::External => "external",
    };

    Json(SystemStats {
        total_users: state.users.len(),
        admin_users: state.users.count_with_role(Role::Admin),
        total_assessments: state.submissions.len(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        auth_mode,
        timestamp: Utc::now(),
    })
}
