#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use hirevia::auth::jwt::{Claims, TokenKeys};
use hirevia::config::{AuthMode, Config, JwtConfig};
use hirevia::state::SharedState;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";
pub const CLIENT_ID: &str = "nextjs-client";

/// A running test server with its shared state exposed for inspection.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        full_name: &str,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "password": password,
                "email": email,
                "fullName": full_name,
            }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login and return the access token.
    pub async fn token(&self, username: &str, password: &str) -> String {
        let (body, status) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn user_token(&self) -> String {
        self.token("testuser", "password123").await
    }

    pub async fn admin_token(&self) -> String {
        self.token("admin", "admin123").await
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_basic(&self, path: &str, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .basic_auth(username, Some(password))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit an assessment and return the generated submission id.
    pub async fn submit(&self, token: &str, body: &Value) -> String {
        let (resp, status) = self.post_auth("/api/submit-assessment", token, body).await;
        assert_eq!(status, StatusCode::OK, "submit failed: {resp}");
        resp["submissionId"].as_str().unwrap().to_string()
    }
}

pub fn assessment(full_name: &str, experience: &str, skills: &[&str]) -> Value {
    json!({
        "fullName": full_name,
        "email": "candidate@example.com",
        "experience": experience,
        "question1": "To manage state and side effects in functional components",
        "question2": "PUT",
        "question3": "Static type checking and better IDE support",
        "codingExperience": "Five years of backend services",
        "projectDescription": "Rebuilt a billing pipeline to handle retries safely",
        "skills": skills,
        "termsAccepted": true,
    })
}

pub fn test_config(auth: AuthMode) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        auth: auth.clone(),
        jwt: JwtConfig {
            secret: Some(JWT_SECRET.to_string()),
            public_key_file: None,
            issuer: None,
            audience: None,
            client_id: CLIENT_ID.to_string(),
            token_ttl_secs: 3600,
        },
        seed_demo_users: auth == AuthMode::Local,
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
    }
}

/// Mint a token the way an external identity provider would.
pub fn external_token(sub: &str, claims: Value) -> String {
    let mut payload = json!({
        "sub": sub,
        "preferred_username": sub,
        "email": format!("{sub}@example.com"),
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let (Some(target), Some(extra)) = (payload.as_object_mut(), claims.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    let claims: Claims = serde_json::from_value(payload).unwrap();
    TokenKeys::hmac(JWT_SECRET, 3600).encode_token(&claims).unwrap()
}

pub async fn spawn_app() -> TestApp {
    spawn_with(test_config(AuthMode::Local)).await
}

pub async fn spawn_with(config: Config) -> TestApp {
    let state = hirevia::build_state(config).expect("Failed to build state");
    let app = hirevia::build_app(state.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        state,
    }
}
