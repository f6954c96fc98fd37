//! Repository Ports - 出站端口
//!
//! 开发后端的剧集持久化抽象（生产环境中为文档数据库）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Episode, EpisodeId, PanelId};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 剧集仓储端口
#[async_trait]
pub trait EpisodeRepositoryPort: Send + Sync {
    /// 保存新剧集
    async fn insert(&self, episode: &Episode) -> Result<(), RepositoryError>;

    /// 根据 ID 查找剧集
    async fn find_by_id(&self, episode_id: &EpisodeId) -> Result<Option<Episode>, RepositoryError>;

    /// 列出剧集（按创建时间倒序，至多 limit 条）
    async fn list_recent(&self, limit: usize) -> Result<Vec<Episode>, RepositoryError>;

    /// 删除剧集，返回是否存在
    async fn delete(&self, episode_id: &EpisodeId) -> Result<bool, RepositoryError>;

    /// 写入分格图片，返回更新后的剧集
    async fn set_panel_image(
        &self,
        episode_id: &EpisodeId,
        panel_id: &PanelId,
        image_base64: &str,
    ) -> Result<Episode, RepositoryError>;
}
