//! Application State
//!
//! 开发后端的所有 Command/Query Handlers

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteEpisodeHandler, GeneratePanelImageHandler, SubmitStoryHandler,
    // Query handlers
    GetEpisodeHandler, ListEpisodesHandler,
    // Ports
    EpisodeRepositoryPort, PanelArtPort, StoryboardPort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub submit_story_handler: SubmitStoryHandler,
    pub generate_panel_handler: GeneratePanelImageHandler,
    pub delete_episode_handler: DeleteEpisodeHandler,

    // ========== Query Handlers ==========
    pub get_episode_handler: GetEpisodeHandler,
    pub list_episodes_handler: ListEpisodesHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        episode_repo: Arc<dyn EpisodeRepositoryPort>,
        storyboarder: Arc<dyn StoryboardPort>,
        artist: Arc<dyn PanelArtPort>,
    ) -> Self {
        Self {
            // Command handlers
            submit_story_handler: SubmitStoryHandler::new(episode_repo.clone(), storyboarder),
            generate_panel_handler: GeneratePanelImageHandler::new(episode_repo.clone(), artist),
            delete_episode_handler: DeleteEpisodeHandler::new(episode_repo.clone()),

            // Query handlers
            get_episode_handler: GetEpisodeHandler::new(episode_repo.clone()),
            list_episodes_handler: ListEpisodesHandler::new(episode_repo),
        }
    }
}
