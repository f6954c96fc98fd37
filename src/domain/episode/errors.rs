//! Episode Context - Errors

use thiserror::Error;

use super::{EpisodeId, PanelId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpisodeError {
    #[error("Episode {0} has no panels")]
    NoPanels(EpisodeId),

    #[error("Duplicate panel id: {0}")]
    DuplicatePanel(PanelId),

    #[error("Panel not found: {0}")]
    PanelNotFound(PanelId),

    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Empty image payload for panel {0}")]
    EmptyImage(PanelId),

    #[error("Story text must not be empty")]
    EmptyStory,
}
