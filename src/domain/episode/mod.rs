//! Episode Context - 剧集限界上下文
//!
//! 职责:
//! - Episode 聚合（有序分格序列）
//! - Panel 实体（叙事文本 + 生成的图片）
//! - 标识、标题、故事提交等值对象

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Episode;
pub use entities::Panel;
pub use errors::EpisodeError;
pub use value_objects::{EpisodeId, PanelId, StorySubmission, Title};
