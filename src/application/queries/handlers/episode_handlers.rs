//! Episode Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::EpisodeRepositoryPort;
use crate::application::queries::{GetEpisode, ListEpisodes};
use crate::domain::Episode;

/// GetEpisode Handler
pub struct GetEpisodeHandler {
    episode_repo: Arc<dyn EpisodeRepositoryPort>,
}

impl GetEpisodeHandler {
    pub fn new(episode_repo: Arc<dyn EpisodeRepositoryPort>) -> Self {
        Self { episode_repo }
    }

    pub async fn handle(&self, query: GetEpisode) -> Result<Episode, ApplicationError> {
        self.episode_repo
            .find_by_id(&query.episode_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Episode", &query.episode_id))
    }
}

/// ListEpisodes Handler
pub struct ListEpisodesHandler {
    episode_repo: Arc<dyn EpisodeRepositoryPort>,
}

impl ListEpisodesHandler {
    pub fn new(episode_repo: Arc<dyn EpisodeRepositoryPort>) -> Self {
        Self { episode_repo }
    }

    pub async fn handle(&self, query: ListEpisodes) -> Result<Vec<Episode>, ApplicationError> {
        let episodes = self.episode_repo.list_recent(query.limit).await?;
        tracing::debug!(count = episodes.len(), "Episodes listed");
        Ok(episodes)
    }
}
