//! Studio Ports - 故事分析与分格绘制
//!
//! 生产环境中分别由语言模型与图像生成服务实现，对客户端不可见

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Panel;

/// Studio 错误
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Story could not be analysed: {0}")]
    Storyboard(String),

    #[error("Panel rendering failed: {0}")]
    Render(String),
}

/// 故事分析请求
#[derive(Debug, Clone)]
pub struct StoryboardRequest {
    pub story_text: String,
    pub character_name: Option<String>,
    pub character_appearance: Option<String>,
}

/// 单个分格的叙事草稿
#[derive(Debug, Clone)]
pub struct PanelDraft {
    pub scene_description: String,
    pub dialogue: Option<String>,
    pub background: Option<String>,
}

/// 故事分析结果
#[derive(Debug, Clone)]
pub struct Storyboard {
    pub title: String,
    pub character_profile: String,
    pub panels: Vec<PanelDraft>,
}

/// 故事分析端口
#[async_trait]
pub trait StoryboardPort: Send + Sync {
    /// 将故事拆分为有序分格
    async fn storyboard(&self, request: &StoryboardRequest) -> Result<Storyboard, StudioError>;
}

/// 分格绘制端口
#[async_trait]
pub trait PanelArtPort: Send + Sync {
    /// 绘制分格，返回 base64 编码的图片
    async fn render(
        &self,
        panel: &Panel,
        character_profile: Option<&str>,
    ) -> Result<String, StudioError>;
}
