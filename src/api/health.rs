//! Liveness check

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Always `healthy` while the process answers
    pub status: String,
    pub version: String,
    /// Books currently held in memory
    pub books: usize,
}

/// Report liveness, crate version and store size
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<crate::AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        books: state.services.books.count().await,
    })
}
