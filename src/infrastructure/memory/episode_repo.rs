//! In-Memory Episode Repository

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{EpisodeRepositoryPort, RepositoryError};
use crate::domain::{Episode, EpisodeError, EpisodeId, PanelId};

/// 内存剧集仓储
pub struct InMemoryEpisodeRepository {
    episodes: DashMap<EpisodeId, Episode>,
}

impl InMemoryEpisodeRepository {
    pub fn new() -> Self {
        Self {
            episodes: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

impl Default for InMemoryEpisodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EpisodeRepositoryPort for InMemoryEpisodeRepository {
    async fn insert(&self, episode: &Episode) -> Result<(), RepositoryError> {
        let episode_id = episode.episode_id().clone();
        if self.episodes.contains_key(&episode_id) {
            return Err(RepositoryError::Duplicate(episode_id.to_string()));
        }
        self.episodes.insert(episode_id.clone(), episode.clone());
        tracing::debug!(episode_id = %episode_id, "Episode stored");
        Ok(())
    }

    async fn find_by_id(&self, episode_id: &EpisodeId) -> Result<Option<Episode>, RepositoryError> {
        Ok(self.episodes.get(episode_id).map(|e| e.clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Episode>, RepositoryError> {
        let mut episodes: Vec<Episode> = self.episodes.iter().map(|e| e.value().clone()).collect();
        episodes.sort_by(|a, b| {
            b.created_date()
                .cmp(&a.created_date())
                .then_with(|| a.episode_id().as_str().cmp(b.episode_id().as_str()))
        });
        episodes.truncate(limit);
        Ok(episodes)
    }

    async fn delete(&self, episode_id: &EpisodeId) -> Result<bool, RepositoryError> {
        let removed = self.episodes.remove(episode_id).is_some();
        if removed {
            tracing::debug!(episode_id = %episode_id, "Episode removed");
        }
        Ok(removed)
    }

    async fn set_panel_image(
        &self,
        episode_id: &EpisodeId,
        panel_id: &PanelId,
        image_base64: &str,
    ) -> Result<Episode, RepositoryError> {
        let mut entry = self
            .episodes
            .get_mut(episode_id)
            .ok_or_else(|| RepositoryError::NotFound(episode_id.to_string()))?;

        let updated = entry
            .with_panel_image(panel_id, image_base64)
            .map_err(|e| match e {
                EpisodeError::PanelNotFound(id) => RepositoryError::NotFound(id.to_string()),
                other => RepositoryError::DatabaseError(other.to_string()),
            })?;
        *entry = updated.clone();

        Ok(updated)
    }
}
