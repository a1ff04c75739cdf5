//! Health and readiness endpoints (ambient; every axum binary in this
//! workspace exposes them the way the teacher's `kalla-worker::health` does).

use axum::{routing::get, Router};

pub fn health_router() -> Router {
    Router::new().route("/health", get(health)).route("/ready", get(ready))
}

async fn health() -> &'static str {
    "OK"
}

async fn ready() -> &'static str {
    "OK"
}
