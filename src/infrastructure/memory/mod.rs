//! Memory Layer - In-Memory State Management
//!
//! 开发后端的剧集存储（替代文档数据库）

mod episode_repo;

pub use episode_repo::InMemoryEpisodeRepository;
