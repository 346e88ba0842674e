use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker prepended to every role name before comparison.
pub const ROLE_PREFIX: &str = "ROLE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// The normalized authority string this role is matched against.
    pub fn authority(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Upper-cases a raw role name and prefixes it with [`ROLE_PREFIX`].
pub fn to_authority(raw: &str) -> String {
    format!("{ROLE_PREFIX}{}", raw.trim().to_uppercase())
}

/// Inverse of [`to_authority`], for presenting roles back to clients.
pub fn strip_authority(authority: &str) -> &str {
    authority.strip_prefix(ROLE_PREFIX).unwrap_or(authority)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleList {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The role-bearing claims of an identity-provider token: realm-wide roles plus
/// roles scoped under each client key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RoleList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_access: Option<HashMap<String, RoleList>>,
}

impl RoleClaims {
    pub fn realm(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            realm_access: Some(RoleList {
                roles: roles.into_iter().map(|r| r.name().to_string()).collect(),
            }),
            resource_access: None,
        }
    }

    /// Union of realm roles and the roles granted under `client_id`, normalized.
    /// Missing claims contribute nothing.
    pub fn authorities(&self, client_id: &str) -> BTreeSet<String> {
        let realm = self.realm_access.iter().flat_map(|r| r.roles.iter());
        let client = self
            .resource_access
            .as_ref()
            .and_then(|access| access.get(client_id))
            .into_iter()
            .flat_map(|r| r.roles.iter());

        realm
            .chain(client)
            .filter(|r| !r.trim().is_empty())
            .map(|r| to_authority(r))
            .collect()
    }
}
