//! Data Transfer Objects
//!
//! 与客户端约定的 JSON 结构（字段名为 snake_case）

use serde::{Deserialize, Serialize};

use crate::application::{GeneratedImage, SubmitStory};
use crate::domain::{Episode, Panel};

/// 时间戳格式：不带时区的 ISO 8601（UTC）
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// ============================================================================
// Story DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitStoryRequest {
    pub story_text: String,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default)]
    pub character_appearance: Option<String>,
}

impl From<SubmitStoryRequest> for SubmitStory {
    fn from(req: SubmitStoryRequest) -> Self {
        Self {
            story_text: req.story_text,
            character_name: req.character_name,
            character_appearance: req.character_appearance,
        }
    }
}

// ============================================================================
// Episode DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub panel_id: String,
    pub order: usize,
    pub scene_description: String,
    pub dialogue: Option<String>,
    pub character_description: Option<String>,
    pub background: Option<String>,
    pub image_base64: Option<String>,
}

impl From<&Panel> for PanelResponse {
    fn from(panel: &Panel) -> Self {
        Self {
            panel_id: panel.panel_id().to_string(),
            order: panel.order(),
            scene_description: panel.scene_description().to_string(),
            dialogue: panel.dialogue().map(str::to_string),
            character_description: panel.character_description().map(str::to_string),
            background: panel.background().map(str::to_string),
            image_base64: panel.image_base64().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EpisodeResponse {
    pub episode_id: String,
    pub title: String,
    pub created_date: String,
    pub user_story_text: Option<String>,
    pub character_profile: Option<String>,
    pub panels: Vec<PanelResponse>,
}

impl From<&Episode> for EpisodeResponse {
    fn from(episode: &Episode) -> Self {
        Self {
            episode_id: episode.episode_id().to_string(),
            title: episode.title().to_string(),
            created_date: episode
                .created_date()
                .naive_utc()
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            user_story_text: episode.user_story_text().map(str::to_string),
            character_profile: episode.character_profile().map(str::to_string),
            panels: episode.panels().iter().map(PanelResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteEpisodeResponse {
    pub message: String,
    pub episode_id: String,
}

// ============================================================================
// Panel DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeneratePanelRequest {
    pub episode_id: String,
    pub panel_id: String,
}

#[derive(Debug, Serialize)]
pub struct PanelImageResponse {
    pub image_base64: String,
    pub status: &'static str,
}

impl From<GeneratedImage> for PanelImageResponse {
    fn from(image: GeneratedImage) -> Self {
        Self {
            status: image.status.as_str(),
            image_base64: image.image_base64,
        }
    }
}

// ============================================================================
// Health DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}
