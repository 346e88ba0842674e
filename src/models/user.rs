use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::roles::Role;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Split a display name into first name and the remainder at the first space.
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    full_name.split_once(' ').unwrap_or((full_name, ""))
}

impl UserAccount {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
