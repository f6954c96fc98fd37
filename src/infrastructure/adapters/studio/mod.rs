//! Studio Adapters - 本地故事分析与占位绘制

mod local_storyboarder;
mod placeholder_artist;

pub use local_storyboarder::{
    character_profile, LocalStoryboarder, DEFAULT_CHARACTER_APPEARANCE, DEFAULT_CHARACTER_NAME,
};
pub use placeholder_artist::PlaceholderArtist;
