//! Episode Context - Value Objects

use serde::Serialize;

use super::EpisodeError;

/// 剧集唯一标识
///
/// 由后端在创建时分配，客户端视为不透明字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Result<Self, EpisodeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EpisodeError::EmptyField("episode_id"));
        }
        Ok(Self(id))
    }

    /// 生成新的标识（仅后端使用）
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 分格唯一标识（在所属剧集内唯一）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Result<Self, EpisodeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EpisodeError::EmptyField("panel_id"));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 剧集标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub const MAX_CHARS: usize = 200;

    pub fn new(title: impl Into<String>) -> Result<Self, EpisodeError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(EpisodeError::EmptyField("title"));
        }
        Ok(Self(trimmed.chars().take(Self::MAX_CHARS).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 故事提交内容
///
/// 不变量: story_text 非空（去除空白后）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySubmission {
    story_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    character_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    character_appearance: Option<String>,
}

impl StorySubmission {
    pub fn new(story_text: impl Into<String>) -> Result<Self, EpisodeError> {
        let story_text = story_text.into();
        if story_text.trim().is_empty() {
            return Err(EpisodeError::EmptyStory);
        }
        Ok(Self {
            story_text,
            character_name: None,
            character_appearance: None,
        })
    }

    pub fn with_character_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = non_blank(name.into());
        self
    }

    pub fn with_character_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.character_appearance = non_blank(appearance.into());
        self
    }

    pub fn story_text(&self) -> &str {
        &self.story_text
    }

    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }

    pub fn character_appearance(&self) -> Option<&str> {
        self.character_appearance.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
