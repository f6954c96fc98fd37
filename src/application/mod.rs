//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（EpisodeStore、Repository、Studio）
//! - hydration: 客户端剧集补全控制器
//! - commands: CQRS 命令及处理器（开发后端）
//! - queries: CQRS 查询及处理器（开发后端）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod hydration;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        DeleteEpisodeHandler, GeneratePanelImageHandler, GeneratedImage, ImageStatus,
        SubmitStoryHandler,
    },
    DeleteEpisode, GeneratePanelImage, SubmitStory,
};

pub use error::ApplicationError;

pub use hydration::{
    HydratedEpisode, HydratedPanel, HydrationController, HydrationError, HydrationReport,
    PanelImageState, PanelOutcome,
};

pub use ports::{
    EpisodeRepositoryPort, EpisodeStorePort, PanelArtPort, PanelDraft, PanelImage,
    RepositoryError, StoreError, StoreErrorKind, StoreOperation, Storyboard, StoryboardPort,
    StoryboardRequest, StudioError,
};

pub use queries::{
    handlers::{GetEpisodeHandler, ListEpisodesHandler},
    GetEpisode, ListEpisodes, DEFAULT_LIST_LIMIT,
};
