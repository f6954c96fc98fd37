//! Episode HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{DeleteEpisode, GetEpisode, ListEpisodes};
use crate::domain::EpisodeId;
use crate::infrastructure::http::dto::{DeleteEpisodeResponse, EpisodeResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn parse_episode_id(raw: String) -> Result<EpisodeId, ApiError> {
    EpisodeId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /api/episodes
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EpisodeResponse>>, ApiError> {
    let episodes = state
        .list_episodes_handler
        .handle(ListEpisodes::default())
        .await?;

    Ok(Json(episodes.iter().map(EpisodeResponse::from).collect()))
}

/// GET /api/episodes/:episode_id
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(episode_id): Path<String>,
) -> Result<Json<EpisodeResponse>, ApiError> {
    let episode_id = parse_episode_id(episode_id)?;
    let episode = state
        .get_episode_handler
        .handle(GetEpisode { episode_id })
        .await?;

    Ok(Json(EpisodeResponse::from(&episode)))
}

/// DELETE /api/episodes/:episode_id
pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    Path(episode_id): Path<String>,
) -> Result<Json<DeleteEpisodeResponse>, ApiError> {
    let episode_id = parse_episode_id(episode_id)?;
    state
        .delete_episode_handler
        .handle(DeleteEpisode {
            episode_id: episode_id.clone(),
        })
        .await?;

    Ok(Json(DeleteEpisodeResponse {
        message: "Episode deleted".to_string(),
        episode_id: episode_id.to_string(),
    }))
}
