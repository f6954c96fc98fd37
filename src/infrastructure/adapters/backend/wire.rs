//! 后端响应的线上结构
//!
//! 所有字段均为可选，在客户端边界统一校验后转换为领域对象；
//! 缺少必填字段的响应会被拒绝，而不是把未定义字段带进界面状态。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Episode, EpisodeId, Panel, PanelId, Title};

#[derive(Debug, Deserialize)]
pub(super) struct PanelWire {
    panel_id: Option<String>,
    order: Option<usize>,
    scene_description: Option<String>,
    dialogue: Option<String>,
    character_description: Option<String>,
    background: Option<String>,
    image_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EpisodeWire {
    episode_id: Option<String>,
    title: Option<String>,
    created_date: Option<String>,
    user_story_text: Option<String>,
    character_profile: Option<String>,
    panels: Option<Vec<PanelWire>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PanelImageWire {
    pub image_base64: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeneratePanelBody<'a> {
    pub episode_id: &'a str,
    pub panel_id: &'a str,
}

/// 解析时间戳：RFC 3339，或不带时区的 ISO 8601（视为 UTC）
pub(super) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("missing field `{}`", field))
}

impl PanelWire {
    fn into_panel(self, index: usize) -> Result<Panel, String> {
        let panel_id = PanelId::new(required(self.panel_id, "panel_id")?)
            .map_err(|e| e.to_string())?;
        let scene = required(self.scene_description, "scene_description")
            .map_err(|e| format!("panel {}: {}", panel_id, e))?;

        Panel::new(panel_id, self.order.unwrap_or(index), scene)
            .map(|p| {
                p.with_dialogue(self.dialogue)
                    .with_character_description(self.character_description)
                    .with_background(self.background)
                    .with_image(self.image_base64)
            })
            .map_err(|e| e.to_string())
    }
}

impl EpisodeWire {
    /// 转换为领域对象；缺少 created_date 时使用接收时间
    pub(super) fn into_episode(self, received_at: DateTime<Utc>) -> Result<Episode, String> {
        let episode_id =
            EpisodeId::new(required(self.episode_id, "episode_id")?).map_err(|e| e.to_string())?;
        let title = Title::new(required(self.title, "title")?).map_err(|e| e.to_string())?;

        let created_date = match self.created_date {
            Some(raw) => parse_timestamp(&raw)
                .ok_or_else(|| format!("invalid `created_date`: {}", raw))?,
            None => {
                tracing::debug!(episode_id = %episode_id, "Response has no created_date, using receipt time");
                received_at
            }
        };

        let panels = self
            .panels
            .ok_or_else(|| "missing field `panels`".to_string())?
            .into_iter()
            .enumerate()
            .map(|(index, p)| p.into_panel(index))
            .collect::<Result<Vec<_>, _>>()?;

        Episode::new(episode_id, title, created_date, panels)
            .map(|e| {
                e.with_story_text(self.user_story_text)
                    .with_character_profile(self.character_profile)
            })
            .map_err(|e| e.to_string())
    }
}
