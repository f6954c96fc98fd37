//! Panel HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::GeneratePanelImage;
use crate::domain::{EpisodeId, PanelId};
use crate::infrastructure::http::dto::{GeneratePanelRequest, PanelImageResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/panels/generate
pub async fn generate_panel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeneratePanelRequest>,
) -> Result<Json<PanelImageResponse>, ApiError> {
    let command = GeneratePanelImage {
        episode_id: EpisodeId::new(req.episode_id)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        panel_id: PanelId::new(req.panel_id).map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    let image = state.generate_panel_handler.handle(command).await?;
    Ok(Json(PanelImageResponse::from(image)))
}
