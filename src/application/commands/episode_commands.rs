//! Episode Commands

use crate::domain::{EpisodeId, PanelId};

/// 提交故事命令
#[derive(Debug, Clone)]
pub struct SubmitStory {
    pub story_text: String,
    pub character_name: Option<String>,
    pub character_appearance: Option<String>,
}

/// 生成分格图片命令
#[derive(Debug, Clone)]
pub struct GeneratePanelImage {
    pub episode_id: EpisodeId,
    pub panel_id: PanelId,
}

/// 删除剧集命令
#[derive(Debug, Clone)]
pub struct DeleteEpisode {
    pub episode_id: EpisodeId,
}
