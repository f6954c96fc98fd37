//! Episode Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{DeleteEpisode, GeneratePanelImage, SubmitStory};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    EpisodeRepositoryPort, PanelArtPort, StoryboardPort, StoryboardRequest,
};
use crate::domain::storyboard::FALLBACK_TITLE;
use crate::domain::{Episode, EpisodeId, Panel, PanelId, Title};

// ============================================================================
// SubmitStory
// ============================================================================

/// SubmitStory Handler - 分析故事并创建无图剧集
pub struct SubmitStoryHandler {
    episode_repo: Arc<dyn EpisodeRepositoryPort>,
    storyboarder: Arc<dyn StoryboardPort>,
}

impl SubmitStoryHandler {
    pub fn new(
        episode_repo: Arc<dyn EpisodeRepositoryPort>,
        storyboarder: Arc<dyn StoryboardPort>,
    ) -> Self {
        Self {
            episode_repo,
            storyboarder,
        }
    }

    pub async fn handle(&self, command: SubmitStory) -> Result<Episode, ApplicationError> {
        let story_text = command.story_text.trim();
        if story_text.is_empty() {
            return Err(ApplicationError::validation("Story text cannot be empty"));
        }

        let request = StoryboardRequest {
            story_text: story_text.to_string(),
            character_name: command.character_name,
            character_appearance: command.character_appearance,
        };
        let board = self.storyboarder.storyboard(&request).await?;
        let profile = board.character_profile;

        let panels = board
            .panels
            .into_iter()
            .enumerate()
            .map(|(order, draft)| {
                Panel::new(PanelId::generate(), order, draft.scene_description).map(|panel| {
                    panel
                        .with_dialogue(draft.dialogue)
                        .with_background(draft.background)
                        .with_character_description(Some(profile.clone()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let title = Title::new(board.title).or_else(|_| Title::new(FALLBACK_TITLE))?;

        let episode = Episode::new(EpisodeId::generate(), title, Utc::now(), panels)?
            .with_story_text(Some(request.story_text))
            .with_character_profile(Some(profile));

        self.episode_repo.insert(&episode).await?;

        tracing::info!(
            episode_id = %episode.episode_id(),
            title = %episode.title(),
            panels = episode.panel_count(),
            "Episode created"
        );

        Ok(episode)
    }
}

// ============================================================================
// GeneratePanelImage
// ============================================================================

/// 图片来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// 分格已有图片，直接返回
    Cached,
    /// 本次新绘制
    Generated,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Cached => "cached",
            ImageStatus::Generated => "generated",
        }
    }
}

/// 生成分格图片响应
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image_base64: String,
    pub status: ImageStatus,
}

/// GeneratePanelImage Handler
pub struct GeneratePanelImageHandler {
    episode_repo: Arc<dyn EpisodeRepositoryPort>,
    artist: Arc<dyn PanelArtPort>,
}

impl GeneratePanelImageHandler {
    pub fn new(episode_repo: Arc<dyn EpisodeRepositoryPort>, artist: Arc<dyn PanelArtPort>) -> Self {
        Self {
            episode_repo,
            artist,
        }
    }

    pub async fn handle(
        &self,
        command: GeneratePanelImage,
    ) -> Result<GeneratedImage, ApplicationError> {
        let episode = self
            .episode_repo
            .find_by_id(&command.episode_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Episode", &command.episode_id))?;

        let panel = episode
            .panel(&command.panel_id)
            .ok_or_else(|| ApplicationError::not_found("Panel", &command.panel_id))?;

        if let Some(image) = panel.image_base64() {
            tracing::debug!(
                episode_id = %command.episode_id,
                panel_id = %command.panel_id,
                "Returning cached panel image"
            );
            return Ok(GeneratedImage {
                image_base64: image.to_string(),
                status: ImageStatus::Cached,
            });
        }

        let image = self
            .artist
            .render(panel, episode.character_profile())
            .await?;

        self.episode_repo
            .set_panel_image(&command.episode_id, &command.panel_id, &image)
            .await?;

        tracing::info!(
            episode_id = %command.episode_id,
            panel_id = %command.panel_id,
            "Panel image generated"
        );

        Ok(GeneratedImage {
            image_base64: image,
            status: ImageStatus::Generated,
        })
    }
}

// ============================================================================
// DeleteEpisode
// ============================================================================

/// DeleteEpisode Handler
pub struct DeleteEpisodeHandler {
    episode_repo: Arc<dyn EpisodeRepositoryPort>,
}

impl DeleteEpisodeHandler {
    pub fn new(episode_repo: Arc<dyn EpisodeRepositoryPort>) -> Self {
        Self { episode_repo }
    }

    pub async fn handle(&self, command: DeleteEpisode) -> Result<(), ApplicationError> {
        if !self.episode_repo.delete(&command.episode_id).await? {
            return Err(ApplicationError::not_found("Episode", &command.episode_id));
        }

        tracing::info!(episode_id = %command.episode_id, "Episode deleted");
        Ok(())
    }
}
