use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::roles::{Role, RoleClaims};
use crate::config::JwtConfig;

/// JWT payload. The shape follows what OpenID identity providers emit, so the
/// same struct decodes both locally issued and externally issued tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(flatten)]
    pub access: RoleClaims,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// A single string or an array, depending on the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        username: &str,
        email: &str,
        full_name: &str,
        roles: &[Role],
        ttl_secs: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            preferred_username: Some(username.to_string()),
            email: Some(email.to_string()),
            name: Some(full_name.to_string()),
            email_verified: None,
            access: RoleClaims::realm(roles.iter().copied()),
            iss: None,
            aud: None,
            jti: Some(Uuid::now_v7().to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        }
    }
}

/// Signing and verification material, built once at startup.
pub struct TokenKeys {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
    pub ttl_secs: i64,
}

impl TokenKeys {
    /// HS256 keys able to both sign and verify.
    pub fn hmac(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            encoding: Some(EncodingKey::from_secret(secret.as_bytes())),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: None,
            audience: None,
            ttl_secs,
        }
    }

    /// Verification-only keys for an RS256 issuer.
    pub fn rsa_public(pem: &[u8], ttl_secs: i64) -> Result<Self, String> {
        let decoding =
            DecodingKey::from_rsa_pem(pem).map_err(|e| format!("Invalid RSA public key: {e}"))?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        Ok(Self {
            encoding: None,
            decoding,
            validation,
            issuer: None,
            audience: None,
            ttl_secs,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, String> {
        let keys = match (&config.public_key_file, &config.secret) {
            (Some(path), _) => {
                let pem = std::fs::read(path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
                Self::rsa_public(&pem, config.token_ttl_secs)?
            }
            (None, Some(secret)) => Self::hmac(secret, config.token_ttl_secs),
            (None, None) => return Err("No JWT key material configured".to_string()),
        };
        Ok(keys.with_checks(config.issuer.as_deref(), config.audience.as_deref()))
    }

    pub fn with_checks(mut self, issuer: Option<&str>, audience: Option<&str>) -> Self {
        if let Some(iss) = issuer {
            self.validation.set_issuer(&[iss]);
            self.issuer = Some(iss.to_string());
        }
        if let Some(aud) = audience {
            self.validation.set_audience(&[aud]);
            self.validation.validate_aud = true;
            self.validation.required_spec_claims.insert("aud".to_string());
            self.audience = Some(aud.to_string());
        }
        self
    }

    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }

    pub fn encode_token(&self, claims: &Claims) -> Result<String, String> {
        let key = self
            .encoding
            .as_ref()
            .ok_or_else(|| "Token signing is not available".to_string())?;
        let mut claims = claims.clone();
        if claims.iss.is_none() {
            claims.iss = self.issuer.clone();
        }
        if claims.aud.is_none() {
            claims.aud = self.audience.clone().map(serde_json::Value::String);
        }
        encode(&Header::default(), &claims, key).map_err(|e| format!("JWT encode failed: {e}"))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, String> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| format!("JWT decode failed: {e}"))
    }
}
