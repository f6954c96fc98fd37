//! DailyToon - 每日故事漫画客户端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Episode Context: 剧集、分格及其不变量
//! - Storyboard: 故事文本到分镜草稿
//!
//! 应用层 (application/):
//! - Ports: EpisodeStore（客户端）、Repository 与 Studio（开发后端）
//! - Hydration: 分格图片补全控制器
//! - Commands / Queries: 开发后端的 CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 剧集客户端、Fake 客户端、本地分镜与占位绘制
//! - HTTP: 本地开发后端（axum）
//! - Memory: 内存剧集仓储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config_from_path, AppConfig};
