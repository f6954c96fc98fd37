//! Episode Store Port - 剧集后端抽象
//!
//! 客户端访问剧集后端的抽象接口，HTTP 实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Episode, EpisodeId, PanelId, StorySubmission};

/// 剧集后端操作（用于错误与日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    SubmitStory,
    GetEpisode,
    ListEpisodes,
    DeleteEpisode,
    GeneratePanelImage,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::SubmitStory => "submit_story",
            StoreOperation::GetEpisode => "get_episode",
            StoreOperation::ListEpisodes => "list_episodes",
            StoreOperation::DeleteEpisode => "delete_episode",
            StoreOperation::GeneratePanelImage => "generate_panel_image",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 剧集后端错误
///
/// 每个操作只会返回以下四类之一，调用方据此选择提示文案
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 无法连接后端
    #[error("Network error: {0}")]
    Network(String),

    /// 超过该操作的等待上限
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: StoreOperation,
        after: Duration,
    },

    /// 引用的剧集/分格不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 后端返回失败（含后端提供的详情）
    #[error("Server error (HTTP {status}): {detail}")]
    Server { status: u16, detail: String },
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Network,
    Timeout,
    NotFound,
    Server,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Network(_) => StoreErrorKind::Network,
            StoreError::Timeout { .. } => StoreErrorKind::Timeout,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Server { .. } => StoreErrorKind::Server,
        }
    }

    /// 面向用户的提示文案
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Timeout { .. } => {
                "The server is taking longer than usual (it may be waking up). Please try again shortly."
                    .to_string()
            }
            StoreError::Network(_) => {
                "Cannot reach the server. Please check your connection.".to_string()
            }
            StoreError::NotFound(_) => {
                "That episode or panel no longer exists.".to_string()
            }
            StoreError::Server { detail, .. } => {
                format!("Something went wrong on the server: {}", detail)
            }
        }
    }
}

/// 分格图片生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelImage {
    /// base64 编码的图片数据
    pub image_base64: String,
    /// 后端是否直接返回了已存在的图片
    pub cached: bool,
}

/// Episode Store Port
///
/// 五个后端操作加健康探测
#[async_trait]
pub trait EpisodeStorePort: Send + Sync {
    /// 提交故事，返回新建的剧集（分格尚无图片）
    async fn submit_story(&self, submission: StorySubmission) -> Result<Episode, StoreError>;

    /// 获取剧集及其分格
    async fn get_episode(&self, episode_id: &EpisodeId) -> Result<Episode, StoreError>;

    /// 列出所有剧集（顺序由后端决定）
    async fn list_episodes(&self) -> Result<Vec<Episode>, StoreError>;

    /// 永久删除剧集及其分格
    async fn delete_episode(&self, episode_id: &EpisodeId) -> Result<(), StoreError>;

    /// 请求生成单个分格的图片
    async fn generate_panel_image(
        &self,
        episode_id: &EpisodeId,
        panel_id: &PanelId,
    ) -> Result<PanelImage, StoreError>;

    /// 检查后端是否可用（尽力而为，不返回错误）
    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_have_distinct_messages() {
        let errors = [
            StoreError::Network("refused".into()),
            StoreError::Timeout {
                operation: StoreOperation::SubmitStory,
                after: Duration::from_secs(60),
            },
            StoreError::NotFound("ep-1".into()),
            StoreError::Server {
                status: 500,
                detail: "boom".into(),
            },
        ];

        let messages: std::collections::HashSet<String> =
            errors.iter().map(StoreError::user_message).collect();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_server_message_carries_detail() {
        let err = StoreError::Server {
            status: 500,
            detail: "Image generation failed".into(),
        };
        assert!(err.user_message().contains("Image generation failed"));
        assert_eq!(err.kind(), StoreErrorKind::Server);
    }

    #[test]
    fn test_timeout_display_names_operation() {
        let err = StoreError::Timeout {
            operation: StoreOperation::GeneratePanelImage,
            after: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "generate_panel_image timed out after 90s");
    }

    #[test]
    fn test_not_found_message_fits_panels() {
        let err = StoreError::NotFound("ep-1/p-9: Panel not found".into());
        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert!(err.user_message().contains("panel"));
    }
}
