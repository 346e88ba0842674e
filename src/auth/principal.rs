use std::collections::BTreeSet;

use crate::auth::roles::{strip_authority, Role};

/// The resolved identity of the caller for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    /// Normalized authorities (`ROLE_*`).
    pub roles: BTreeSet<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub email_verified: Option<bool>,
}

impl Principal {
    pub fn new(id: impl Into<String>, roles: BTreeSet<String>) -> Self {
        Self {
            id: id.into(),
            roles,
            username: None,
            email: None,
            name: None,
            email_verified: None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.authority())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Display name for logs and `retrievedBy`-style fields.
    pub fn label(&self) -> &str {
        self.email
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id)
    }

    /// Role names without the authority prefix, sorted.
    pub fn role_names(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|r| strip_authority(r).to_string())
            .collect()
    }
}
