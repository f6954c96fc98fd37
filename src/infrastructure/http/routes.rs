//! HTTP Routes
//!
//! API Endpoints:
//! - /api/                       GET     服务信息
//! - /api/health                 GET     健康检查
//! - /api/story/submit           POST    提交故事，创建剧集（分格无图）
//! - /api/episodes               GET     列出剧集（最新在前）
//! - /api/episodes/:episode_id   GET     获取剧集
//! - /api/episodes/:episode_id   DELETE  删除剧集
//! - /api/panels/generate        POST    生成分格图片

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/story/submit", post(handlers::submit_story))
        .route("/api/episodes", get(handlers::list_episodes))
        .route(
            "/api/episodes/:episode_id",
            get(handlers::get_episode).delete(handlers::delete_episode),
        )
        .route("/api/panels/generate", post(handlers::generate_panel))
}
