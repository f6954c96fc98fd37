//! Command Handlers 实现

mod episode_handlers;

pub use episode_handlers::*;
