//! Episode Context - Entities

use serde::Serialize;

use super::{EpisodeError, PanelId};

/// 分格 - 漫画的一帧
///
/// 不变量:
/// - panel_id 在所属 Episode 内唯一
/// - scene_description 不可为空，创建后不可修改
/// - image_base64 只会从无到有，或被更新的生成结果覆盖，永不清空
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    panel_id: PanelId,
    /// 叙事顺序（后端提供）
    order: usize,
    scene_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dialogue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    character_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    image_base64: Option<String>,
}

impl Panel {
    pub fn new(
        panel_id: PanelId,
        order: usize,
        scene_description: impl Into<String>,
    ) -> Result<Self, EpisodeError> {
        let scene_description = scene_description.into();
        if scene_description.trim().is_empty() {
            return Err(EpisodeError::EmptyField("scene_description"));
        }
        Ok(Self {
            panel_id,
            order,
            scene_description,
            dialogue: None,
            character_description: None,
            background: None,
            image_base64: None,
        })
    }

    /// 空字符串视为无对白
    pub fn with_dialogue(mut self, dialogue: Option<String>) -> Self {
        self.dialogue = dialogue.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_character_description(mut self, description: Option<String>) -> Self {
        self.character_description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background = background.filter(|b| !b.trim().is_empty());
        self
    }

    /// 从存储/响应中恢复已生成的图片
    pub fn with_image(mut self, image_base64: Option<String>) -> Self {
        self.image_base64 = image_base64.filter(|i| !i.is_empty());
        self
    }

    /// 返回附加了图片的新分格（覆盖旧图片）
    pub fn attach_image(&self, image_base64: impl Into<String>) -> Result<Self, EpisodeError> {
        let image_base64 = image_base64.into();
        if image_base64.is_empty() {
            return Err(EpisodeError::EmptyImage(self.panel_id.clone()));
        }
        Ok(Self {
            image_base64: Some(image_base64),
            ..self.clone()
        })
    }

    pub fn panel_id(&self) -> &PanelId {
        &self.panel_id
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn scene_description(&self) -> &str {
        &self.scene_description
    }

    pub fn dialogue(&self) -> Option<&str> {
        self.dialogue.as_deref()
    }

    pub fn character_description(&self) -> Option<&str> {
        self.character_description.as_deref()
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn image_base64(&self) -> Option<&str> {
        self.image_base64.as_deref()
    }

    pub fn has_image(&self) -> bool {
        self.image_base64.is_some()
    }

    /// 叙事内容是否一致（忽略图片）
    pub fn same_narrative(&self, other: &Panel) -> bool {
        self.panel_id == other.panel_id
            && self.order == other.order
            && self.scene_description == other.scene_description
            && self.dialogue == other.dialogue
    }
}
