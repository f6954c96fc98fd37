//! 剧集补全 - 为缺图分格逐一请求生成并合并结果

mod controller;
mod state;

pub use controller::{HydrationController, HydrationError, HydrationReport, PanelOutcome};
pub use state::{HydratedEpisode, HydratedPanel, PanelImageState};
