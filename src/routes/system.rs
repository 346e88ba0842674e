use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

const SERVICE: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct EndpointIndex {
    pub health: &'static str,
    pub api: &'static str,
    pub auth: &'static str,
}

#[derive(Serialize)]
pub struct Welcome {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointIndex,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "UP",
        service: SERVICE,
        version: VERSION,
        timestamp: Utc::now(),
    })
}

pub async fn welcome() -> Json<Welcome> {
    Json(Welcome {
        status: "running",
        message: "Hirevia Backend API",
        version: VERSION,
        endpoints: EndpointIndex {
            health: "/health",
            api: "/api",
            auth: "/api/auth/login",
        },
    })
}
