//! 分格图片状态
//!
//! 每个分格的生成状态与分格数据存放在一起（HydratedPanel），
//! 所有更新都通过重建分格序列完成，不在原序列上就地修改。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Episode, EpisodeError, EpisodeId, Panel, PanelId, Title};

/// 分格图片状态（仅客户端，不持久化）
///
/// 状态转换:
/// - Missing -> InProgress: 发出生成请求
/// - InProgress -> Present: 生成成功
/// - InProgress -> Missing: 生成失败（可手动重试）
/// - Present 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelImageState {
    Missing,
    InProgress,
    Present,
}

impl PanelImageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelImageState::Missing => "missing",
            PanelImageState::InProgress => "in_progress",
            PanelImageState::Present => "present",
        }
    }
}

impl std::fmt::Display for PanelImageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分格及其图片状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedPanel {
    panel: Panel,
    state: PanelImageState,
}

impl HydratedPanel {
    pub fn from_panel(panel: Panel) -> Self {
        let state = if panel.has_image() {
            PanelImageState::Present
        } else {
            PanelImageState::Missing
        };
        Self { panel, state }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_id(&self) -> &PanelId {
        self.panel.panel_id()
    }

    pub fn state(&self) -> PanelImageState {
        self.state
    }

    /// 失败后等待手动重试
    pub fn is_retryable(&self) -> bool {
        self.state == PanelImageState::Missing
    }
}

/// 正在补全图片的剧集视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedEpisode {
    episode_id: EpisodeId,
    title: Title,
    created_date: DateTime<Utc>,
    user_story_text: Option<String>,
    character_profile: Option<String>,
    panels: Vec<HydratedPanel>,
}

impl HydratedEpisode {
    pub fn from_episode(episode: Episode) -> Self {
        Self {
            episode_id: episode.episode_id().clone(),
            title: episode.title().clone(),
            created_date: episode.created_date(),
            user_story_text: episode.user_story_text().map(str::to_string),
            character_profile: episode.character_profile().map(str::to_string),
            panels: episode
                .panels()
                .iter()
                .cloned()
                .map(HydratedPanel::from_panel)
                .collect(),
        }
    }

    pub fn episode_id(&self) -> &EpisodeId {
        &self.episode_id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn panels(&self) -> &[HydratedPanel] {
        &self.panels
    }

    pub fn panel(&self, panel_id: &PanelId) -> Option<&HydratedPanel> {
        self.panels.iter().find(|p| p.panel_id() == panel_id)
    }

    pub fn state_of(&self, panel_id: &PanelId) -> Option<PanelImageState> {
        self.panel(panel_id).map(HydratedPanel::state)
    }

    pub fn count(&self, state: PanelImageState) -> usize {
        self.panels.iter().filter(|p| p.state == state).count()
    }

    pub fn is_complete(&self) -> bool {
        self.count(PanelImageState::Present) == self.panels.len()
    }

    /// 需要生成图片的分格（叙事顺序）
    pub fn missing_panel_ids(&self) -> Vec<PanelId> {
        self.panels
            .iter()
            .filter(|p| p.state == PanelImageState::Missing)
            .map(|p| p.panel_id().clone())
            .collect()
    }

    /// 替换单个分格，其余分格保持不变
    ///
    /// 按 panel_id 定位，构建新的分格序列；未知分格返回原状态
    fn replace_panel(
        &self,
        panel_id: &PanelId,
        update: impl FnOnce(&HydratedPanel) -> HydratedPanel,
    ) -> Self {
        let Some(index) = self.panels.iter().position(|p| p.panel_id() == panel_id) else {
            tracing::debug!(panel_id = %panel_id, "Ignoring update for unknown panel");
            return self.clone();
        };

        let mut panels = self.panels.clone();
        panels[index] = update(&self.panels[index]);

        Self {
            panels,
            ..self.clone()
        }
    }

    /// Missing -> InProgress；其他状态保持不变
    pub fn with_generation_started(&self, panel_id: &PanelId) -> Self {
        self.replace_panel(panel_id, |p| {
            let state = match p.state {
                PanelImageState::Missing => PanelImageState::InProgress,
                other => other,
            };
            HydratedPanel {
                panel: p.panel.clone(),
                state,
            }
        })
    }

    /// 合并生成的图片：按 panel_id 匹配，覆盖旧图片，状态变为 Present
    ///
    /// 空图片不会清除已有图片，失败时与 with_generation_failed 一致
    pub fn with_image(&self, panel_id: &PanelId, image_base64: impl Into<String>) -> Self {
        let image_base64 = image_base64.into();
        self.replace_panel(panel_id, |p| match p.panel.attach_image(image_base64) {
            Ok(panel) => HydratedPanel {
                panel,
                state: PanelImageState::Present,
            },
            Err(e) => {
                tracing::warn!(panel_id = %p.panel_id(), error = %e, "Discarding image update");
                failed(p)
            }
        })
    }

    /// InProgress -> Missing；已有图片的分格保持 Present
    pub fn with_generation_failed(&self, panel_id: &PanelId) -> Self {
        self.replace_panel(panel_id, failed)
    }

    /// 还原为领域对象
    pub fn to_episode(&self) -> Result<Episode, EpisodeError> {
        Episode::new(
            self.episode_id.clone(),
            self.title.clone(),
            self.created_date,
            self.panels.iter().map(|p| p.panel.clone()).collect(),
        )
        .map(|e| {
            e.with_story_text(self.user_story_text.clone())
                .with_character_profile(self.character_profile.clone())
        })
    }
}

fn failed(p: &HydratedPanel) -> HydratedPanel {
    let state = if p.panel.has_image() {
        PanelImageState::Present
    } else {
        PanelImageState::Missing
    };
    HydratedPanel {
        panel: p.panel.clone(),
        state,
    }
}
