//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod http;
pub mod memory;

pub use adapters::{FakeEpisodeStore, HttpEpisodeStore, HttpEpisodeStoreConfig};
pub use memory::InMemoryEpisodeRepository;
