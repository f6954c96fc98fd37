//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod episode_store;
mod repositories;
mod studio;

pub use episode_store::{EpisodeStorePort, PanelImage, StoreError, StoreErrorKind, StoreOperation};
pub use repositories::{EpisodeRepositoryPort, RepositoryError};
pub use studio::{
    PanelArtPort, PanelDraft, Storyboard, StoryboardPort, StoryboardRequest, StudioError,
};
