//! Domain Layer - 领域层
//!
//! - Episode Context: 剧集与分格
//! - Storyboard: 故事文本到分镜草稿的拆分

pub mod episode;
pub mod storyboard;

pub use episode::{Episode, EpisodeError, EpisodeId, Panel, PanelId, StorySubmission, Title};
pub use storyboard::{derive_title, draft_scenes, SceneDraft, StoryboardConfig};
