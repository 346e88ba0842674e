use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub auth: AuthMode,
    pub jwt: JwtConfig,
    pub seed_demo_users: bool,
    pub max_body_size: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// Accounts live in the in-memory user directory; this service signs its own tokens.
    Local,
    /// Tokens come from an external issuer; only verification happens here.
    External,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub public_key_file: Option<PathBuf>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub client_id: String,
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("HIREVIA_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HIREVIA_HOST: {e}"))?;

        let port: u16 = env_or("HIREVIA_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid HIREVIA_PORT: {e}"))?;

        let auth = match env_or("HIREVIA_AUTH_MODE", "local").as_str() {
            "local" | "mock" => AuthMode::Local,
            "external" => AuthMode::External,
            other => return Err(format!("Invalid HIREVIA_AUTH_MODE: {other}")),
        };

        let secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        let public_key_file = std::env::var("HIREVIA_JWT_PUBLIC_KEY_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        match auth {
            AuthMode::Local if secret.is_none() => {
                return Err("Missing required environment variable: JWT_SECRET".to_string());
            }
            AuthMode::External if secret.is_none() && public_key_file.is_none() => {
                return Err(
                    "External auth needs JWT_SECRET or HIREVIA_JWT_PUBLIC_KEY_FILE".to_string(),
                );
            }
            _ => {}
        }

        let token_ttl_secs: i64 = env_or("HIREVIA_TOKEN_TTL_SECS", "3600")
            .parse()
            .map_err(|e| format!("Invalid HIREVIA_TOKEN_TTL_SECS: {e}"))?;
        if token_ttl_secs <= 0 {
            return Err("HIREVIA_TOKEN_TTL_SECS must be positive".to_string());
        }

        let jwt = JwtConfig {
            secret,
            public_key_file,
            issuer: std::env::var("HIREVIA_JWT_ISSUER").ok().filter(|s| !s.is_empty()),
            audience: std::env::var("HIREVIA_JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
            client_id: env_or("HIREVIA_JWT_CLIENT_ID", "nextjs-client"),
            token_ttl_secs,
        };

        let seed_default = if auth == AuthMode::Local { "true" } else { "false" };
        let seed_demo_users = parse_bool(
            "HIREVIA_SEED_DEMO_USERS",
            &env_or("HIREVIA_SEED_DEMO_USERS", seed_default),
        )?;

        let max_body_size: usize = env_or("HIREVIA_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid HIREVIA_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("HIREVIA_LOG_LEVEL", "info");

        Ok(Config {
            host,
            port,
            auth,
            jwt,
            seed_demo_users,
            max_body_size,
            log_level,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {key}: {other}")),
    }
}
