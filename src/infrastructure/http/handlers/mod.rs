//! HTTP Handlers

mod episode;
mod health;
mod panel;
mod story;

pub use episode::*;
pub use health::*;
pub use panel::*;
pub use story::*;
