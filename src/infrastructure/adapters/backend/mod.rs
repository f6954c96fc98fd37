//! Episode Store Adapters - HTTP 客户端与内存 Fake

mod fake_episode_store;
mod http_episode_store;
mod wire;

pub use fake_episode_store::{FakeEpisodeStore, PanelScript};
pub use http_episode_store::*;
