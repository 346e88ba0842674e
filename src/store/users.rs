use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::auth::password;
use crate::auth::roles::Role;
use crate::error::AppError;
use crate::models::UserAccount;

/// Local accounts, keyed by username.
pub struct UserDirectory {
    users: DashMap<String, UserAccount>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Directory pre-populated with `testuser` / `password123` (USER) and
    /// `admin` / `admin123` (USER, ADMIN).
    pub fn with_demo_users() -> Result<Self, String> {
        let directory = Self::new();
        directory.create(
            "testuser",
            &password::hash("password123")?,
            "testuser@example.com",
            "Test User",
            vec![Role::User],
        )
        .map_err(|e| e.to_string())?;
        directory.create(
            "admin",
            &password::hash("admin123")?,
            "admin@example.com",
            "Admin User",
            vec![Role::User, Role::Admin],
        )
        .map_err(|e| e.to_string())?;
        Ok(directory)
    }

    pub fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Insert a new account. Fails with `Conflict` if the username is taken.
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        full_name: &str,
        roles: Vec<Role>,
    ) -> Result<UserAccount, AppError> {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict("Username already exists".to_string())),
            Entry::Vacant(slot) => {
                let account = UserAccount {
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    email: email.to_string(),
                    full_name: full_name.to_string(),
                    roles,
                    created_at: Utc::now(),
                };
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    pub fn find(&self, username: &str) -> Option<UserAccount> {
        self.users.get(username).map(|u| u.value().clone())
    }

    /// Check a username/password pair. `Ok(None)` means the credentials are wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserAccount>, String> {
        let Some(account) = self.find(username) else {
            password::verify_dummy(password);
            return Ok(None);
        };

        if password::verify(password, &account.password_hash)? {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    /// All accounts, oldest first.
    pub fn list(&self) -> Vec<UserAccount> {
        let mut users: Vec<UserAccount> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn count_with_role(&self, role: Role) -> usize {
        self.users.iter().filter(|u| u.value().has_role(role)).count()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
