//! Episode Queries

use crate::domain::EpisodeId;

/// 列表默认上限
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// 获取剧集详情查询
#[derive(Debug, Clone)]
pub struct GetEpisode {
    pub episode_id: EpisodeId,
}

/// 列出剧集查询（按创建时间倒序）
#[derive(Debug, Clone)]
pub struct ListEpisodes {
    pub limit: usize,
}

impl Default for ListEpisodes {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}
