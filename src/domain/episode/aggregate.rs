//! Episode Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::{EpisodeError, EpisodeId, Panel, PanelId, Title};

/// Episode 聚合根
///
/// 不变量:
/// - 至少包含一个 Panel
/// - Panel 顺序即叙事顺序，创建后不可重排
/// - panel_id 在 Episode 内唯一
/// - 标题与叙事文本创建后不可修改，只有分格图片可以追加
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    episode_id: EpisodeId,
    title: Title,
    created_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_story_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    character_profile: Option<String>,
    panels: Vec<Panel>,
}

impl Episode {
    pub fn new(
        episode_id: EpisodeId,
        title: Title,
        created_date: DateTime<Utc>,
        panels: Vec<Panel>,
    ) -> Result<Self, EpisodeError> {
        if panels.is_empty() {
            return Err(EpisodeError::NoPanels(episode_id));
        }

        let mut seen = HashSet::with_capacity(panels.len());
        for panel in &panels {
            if !seen.insert(panel.panel_id()) {
                return Err(EpisodeError::DuplicatePanel(panel.panel_id().clone()));
            }
        }

        Ok(Self {
            episode_id,
            title,
            created_date,
            user_story_text: None,
            character_profile: None,
            panels,
        })
    }

    pub fn with_story_text(mut self, story_text: Option<String>) -> Self {
        self.user_story_text = story_text;
        self
    }

    pub fn with_character_profile(mut self, profile: Option<String>) -> Self {
        self.character_profile = profile.filter(|p| !p.trim().is_empty());
        self
    }

    /// 返回某个分格附加图片后的新 Episode
    ///
    /// 按 panel_id 匹配而非位置索引；重建分格序列，仅替换目标分格
    pub fn with_panel_image(
        &self,
        panel_id: &PanelId,
        image_base64: impl Into<String>,
    ) -> Result<Self, EpisodeError> {
        let target = self
            .panel(panel_id)
            .ok_or_else(|| EpisodeError::PanelNotFound(panel_id.clone()))?;
        let updated = target.attach_image(image_base64)?;

        let panels = self
            .panels
            .iter()
            .map(|p| {
                if p.panel_id() == panel_id {
                    updated.clone()
                } else {
                    p.clone()
                }
            })
            .collect();

        Ok(Self {
            panels,
            ..self.clone()
        })
    }

    // Getters
    pub fn episode_id(&self) -> &EpisodeId {
        &self.episode_id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn user_story_text(&self) -> Option<&str> {
        self.user_story_text.as_deref()
    }

    pub fn character_profile(&self) -> Option<&str> {
        self.character_profile.as_deref()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, panel_id: &PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.panel_id() == panel_id)
    }

    /// 尚未生成图片的分格（保持叙事顺序）
    pub fn panels_missing_images(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| !p.has_image())
    }

    pub fn is_fully_illustrated(&self) -> bool {
        self.panels.iter().all(Panel::has_image)
    }

    /// 分格序列的叙事内容是否与另一 Episode 一致（id、顺序、文本）
    pub fn same_storyboard(&self, other: &Episode) -> bool {
        self.panels.len() == other.panels.len()
            && self
                .panels
                .iter()
                .zip(other.panels.iter())
                .all(|(a, b)| a.same_narrative(b))
    }
}
