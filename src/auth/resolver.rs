use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::headers::authorization::{Basic, Bearer};
use axum_extra::headers::{Authorization, HeaderMapExt};

use crate::auth::jwt::{Claims, TokenKeys};
use crate::auth::principal::Principal;
use crate::config::AuthMode;
use crate::error::AppError;
use crate::models::UserAccount;
use crate::rate_limit::LoginRateLimiter;
use crate::store::UserDirectory;

#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
}

/// Read the `Authorization` header. `Ok(None)` when the header is absent; an
/// unrecognized or malformed header is an authentication failure.
pub fn credentials_from_headers(headers: &HeaderMap) -> Result<Option<Credentials>, AppError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Ok(None);
    }

    if let Ok(Some(Authorization(bearer))) = headers.typed_try_get::<Authorization<Bearer>>() {
        let token = bearer.token().trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("Empty bearer token".to_string()));
        }
        return Ok(Some(Credentials::Bearer(token.to_string())));
    }

    if let Ok(Some(Authorization(basic))) = headers.typed_try_get::<Authorization<Basic>>() {
        return Ok(Some(Credentials::Basic {
            username: basic.username().to_string(),
            password: basic.password().to_string(),
        }));
    }

    Err(AppError::Unauthorized(
        "Invalid authorization header".to_string(),
    ))
}

/// Turns request credentials into a [`Principal`].
pub struct IdentityResolver {
    mode: AuthMode,
    keys: TokenKeys,
    client_id: String,
}

impl IdentityResolver {
    pub fn new(mode: AuthMode, keys: TokenKeys, client_id: impl Into<String>) -> Self {
        Self {
            mode,
            keys,
            client_id: client_id.into(),
        }
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// `Ok(None)` means the request carried no credentials at all.
    ///
    /// Basic credentials count against the same per-username limiter as the
    /// login endpoint.
    pub fn resolve(
        &self,
        headers: &HeaderMap,
        users: &UserDirectory,
        limiter: &LoginRateLimiter,
    ) -> Result<Option<Principal>, AppError> {
        let Some(credentials) = credentials_from_headers(headers)? else {
            return Ok(None);
        };

        match credentials {
            Credentials::Bearer(token) => {
                let claims = self
                    .keys
                    .decode_token(&token)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
                Ok(Some(self.from_claims(claims)))
            }
            Credentials::Basic { username, password } => {
                if self.mode != AuthMode::Local {
                    return Err(AppError::Unauthorized(
                        "Basic authentication is not supported".to_string(),
                    ));
                }
                if limiter.check(&username).is_err() {
                    return Err(AppError::RateLimited(
                        "Too many login attempts. Please try again later.".to_string(),
                    ));
                }
                let Some(account) = users
                    .authenticate(&username, &password)
                    .map_err(AppError::Internal)?
                else {
                    limiter.record_failure(&username);
                    return Err(AppError::Unauthorized("Invalid credentials".to_string()));
                };
                limiter.reset(&account.username);
                Ok(Some(principal_for_account(&account)))
            }
        }
    }

    pub fn from_claims(&self, claims: Claims) -> Principal {
        let roles = claims.access.authorities(&self.client_id);
        let mut principal = Principal::new(claims.sub, roles);
        principal.username = claims.preferred_username;
        principal.email = claims.email;
        principal.name = claims.name;
        principal.email_verified = claims.email_verified;
        principal
    }
}

pub fn principal_for_account(account: &UserAccount) -> Principal {
    let roles = account
        .roles
        .iter()
        .map(|r| r.authority().to_string())
        .collect();
    let mut principal = Principal::new(account.username.clone(), roles);
    principal.username = Some(account.username.clone());
    principal.email = Some(account.email.clone());
    principal.name = Some(account.full_name.clone());
    principal
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::auth::roles::Role;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    fn resolver(mode: AuthMode) -> IdentityResolver {
        IdentityResolver::new(mode, TokenKeys::hmac(SECRET, 3600), "nextjs-client")
    }

    #[test]
    fn no_header_means_no_credentials() {
        assert_eq!(credentials_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn parses_bearer_and_basic() {
        assert_eq!(
            credentials_from_headers(&headers("Bearer abc.def.ghi")).unwrap(),
            Some(Credentials::Bearer("abc.def.ghi".into()))
        );
        // admin:admin123
        assert_eq!(
            credentials_from_headers(&headers("Basic YWRtaW46YWRtaW4xMjM=")).unwrap(),
            Some(Credentials::Basic {
                username: "admin".into(),
                password: "admin123".into()
            })
        );
    }

    #[test]
    fn unknown_scheme_is_unauthenticated() {
        assert!(matches!(
            credentials_from_headers(&headers("Digest whatever")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn external_claims_become_principal() {
        let r = resolver(AuthMode::External);
        let claims: Claims = serde_json::from_value(json!({
            "sub": "f81d4fae",
            "preferred_username": "jdoe",
            "email": "jdoe@example.com",
            "email_verified": true,
            "realm_access": { "roles": ["user"] },
            "resource_access": { "nextjs-client": { "roles": ["admin"] } },
            "exp": 4102444800i64
        }))
        .unwrap();

        let p = r.from_claims(claims);
        assert_eq!(p.id, "f81d4fae");
        assert!(p.has_role(Role::User));
        assert!(p.has_role(Role::Admin));
        assert_eq!(p.username.as_deref(), Some("jdoe"));
        assert_eq!(p.email_verified, Some(true));
    }

    #[test]
    fn token_without_role_claims_has_no_roles() {
        let r = resolver(AuthMode::External);
        let token = r
            .keys()
            .encode_token(&Claims::new("bare", "b@example.com", "Bare", &[], 3600))
            .unwrap();

        let p = r
            .resolve(
                &headers(&format!("Bearer {token}")),
                &UserDirectory::new(),
                &LoginRateLimiter::new(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(p.id, "bare");
        assert!(p.roles.is_empty());
    }

    #[test]
    fn invalid_token_is_unauthenticated() {
        let r = resolver(AuthMode::Local);
        let result = r.resolve(
            &headers("Bearer mock-jwt-token-admin"),
            &UserDirectory::new(),
            &LoginRateLimiter::new(),
        );
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn basic_auth_only_in_local_mode() {
        let users = UserDirectory::with_demo_users().unwrap();
        let limiter = LoginRateLimiter::new();
        let h = headers("Basic YWRtaW46YWRtaW4xMjM=");

        let p = resolver(AuthMode::Local)
            .resolve(&h, &users, &limiter)
            .unwrap()
            .unwrap();
        assert_eq!(p.id, "admin");
        assert!(p.is_admin());

        assert!(matches!(
            resolver(AuthMode::External).resolve(&h, &users, &limiter),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn basic_auth_failures_lock_the_username() {
        let users = UserDirectory::with_demo_users().unwrap();
        let limiter = LoginRateLimiter::with_limits(2, std::time::Duration::from_secs(60));
        let r = resolver(AuthMode::Local);
        // admin:wrong
        let bad = headers("Basic YWRtaW46d3Jvbmc=");
        // admin:admin123
        let good = headers("Basic YWRtaW46YWRtaW4xMjM=");

        for _ in 0..2 {
            assert!(matches!(
                r.resolve(&bad, &users, &limiter),
                Err(AppError::Unauthorized(_))
            ));
        }
        assert!(matches!(
            r.resolve(&good, &users, &limiter),
            Err(AppError::RateLimited(_))
        ));
        assert!(limiter.check("admin").is_err());
    }

    #[test]
    fn basic_auth_success_clears_failures() {
        let users = UserDirectory::with_demo_users().unwrap();
        let limiter = LoginRateLimiter::with_limits(2, std::time::Duration::from_secs(60));
        let r = resolver(AuthMode::Local);

        assert!(r.resolve(&headers("Basic YWRtaW46d3Jvbmc="), &users, &limiter).is_err());
        assert!(r
            .resolve(&headers("Basic YWRtaW46YWRtaW4xMjM="), &users, &limiter)
            .unwrap()
            .is_some());
        assert!(r.resolve(&headers("Basic YWRtaW46d3Jvbmc="), &users, &limiter).is_err());
        assert!(limiter.check("admin").is_ok());
    }
}
