//! Local Storyboarder - 按句拆分故事的分镜实现
//!
//! 不调用语言模型；句子按顺序分组为分格，首句作为标题

use async_trait::async_trait;

use crate::application::ports::{
    PanelDraft, Storyboard, StoryboardPort, StoryboardRequest, StudioError,
};
use crate::domain::{derive_title, draft_scenes, StoryboardConfig};

/// 未提供角色名时使用
pub const DEFAULT_CHARACTER_NAME: &str = "the main character";

/// 未提供角色外貌时使用
pub const DEFAULT_CHARACTER_APPEARANCE: &str =
    "a young person with expressive eyes, dark hair, casual modern clothing";

/// 本地分镜生成器
#[derive(Debug, Clone, Default)]
pub struct LocalStoryboarder {
    config: StoryboardConfig,
}

impl LocalStoryboarder {
    pub fn new(config: StoryboardConfig) -> Self {
        Self { config }
    }
}

/// "name: appearance"
pub fn character_profile(name: Option<&str>, appearance: Option<&str>) -> String {
    let pick = |value: Option<&str>, fallback: &'static str| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    format!(
        "{}: {}",
        pick(name, DEFAULT_CHARACTER_NAME),
        pick(appearance, DEFAULT_CHARACTER_APPEARANCE)
    )
}

#[async_trait]
impl StoryboardPort for LocalStoryboarder {
    async fn storyboard(&self, request: &StoryboardRequest) -> Result<Storyboard, StudioError> {
        let scenes = draft_scenes(&request.story_text, &self.config);
        if scenes.is_empty() {
            return Err(StudioError::Storyboard(
                "story produced no scenes".to_string(),
            ));
        }

        let panels = scenes
            .into_iter()
            .map(|scene| PanelDraft {
                scene_description: scene.scene_description,
                dialogue: scene.dialogue,
                background: None,
            })
            .collect::<Vec<_>>();

        tracing::debug!(panels = panels.len(), "Storyboard drafted");

        Ok(Storyboard {
            title: derive_title(&request.story_text),
            character_profile: character_profile(
                request.character_name.as_deref(),
                request.character_appearance.as_deref(),
            ),
            panels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> StoryboardRequest {
        StoryboardRequest {
            story_text: text.to_string(),
            character_name: None,
            character_appearance: None,
        }
    }

    #[tokio::test]
    async fn test_storyboard_keeps_narrative_order() {
        let storyboarder = LocalStoryboarder::new(StoryboardConfig {
            min_chars: 1,
            max_panels: 6,
        });

        let board = storyboarder
            .storyboard(&request("I went hiking. I saw a fox. It ran away."))
            .await
            .unwrap();

        assert_eq!(board.title, "I went hiking");
        let scenes: Vec<&str> = board
            .panels
            .iter()
            .map(|p| p.scene_description.as_str())
            .collect();
        assert_eq!(scenes, vec!["I went hiking.", "I saw a fox.", "It ran away."]);
    }

    #[tokio::test]
    async fn test_storyboard_respects_max_panels() {
        let storyboarder = LocalStoryboarder::new(StoryboardConfig {
            min_chars: 1,
            max_panels: 2,
        });

        let board = storyboarder
            .storyboard(&request("One. Two. Three. Four."))
            .await
            .unwrap();

        assert_eq!(board.panels.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_story_is_rejected() {
        let storyboarder = LocalStoryboarder::default();
        let result = storyboarder.storyboard(&request("   \n ")).await;
        assert!(matches!(result, Err(StudioError::Storyboard(_))));
    }

    #[test]
    fn test_character_profile_defaults() {
        assert_eq!(
            character_profile(None, None),
            format!("{}: {}", DEFAULT_CHARACTER_NAME, DEFAULT_CHARACTER_APPEARANCE)
        );
        assert_eq!(
            character_profile(Some("Mina"), Some("  ")),
            format!("Mina: {}", DEFAULT_CHARACTER_APPEARANCE)
        );
    }
}
