//! Health Handlers

use axum::Json;
use chrono::Utc;

use crate::infrastructure::http::dto::{HealthResponse, RootResponse};

/// 健康检查
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    })
}

/// API 根路径
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "DailyToon API",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}
