//! Story HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{EpisodeResponse, SubmitStoryRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/story/submit
pub async fn submit_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitStoryRequest>,
) -> Result<Json<EpisodeResponse>, ApiError> {
    let episode = state.submit_story_handler.handle(req.into()).await?;
    Ok(Json(EpisodeResponse::from(&episode)))
}
