use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{PlayerProfile, Prediction};

use super::AppState;

pub const SERVICE_MESSAGE: &str = "Valorant AI Recommender API is running!";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
    pub version: String,
}

/// Health check; independent of model state
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: SERVICE_MESSAGE.to_string(),
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Recommends an agent and sensitivity for the submitted profile
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<PlayerProfile>, JsonRejection>,
) -> AppResult<Json<Prediction>> {
    let Json(profile) = payload.map_err(|rejection| {
        tracing::debug!(request_id = %request_id, error = %rejection, "Rejected request body");
        AppError::Validation(rejection.body_text())
    })?;
    profile.validate()?;

    tracing::info!(
        request_id = %request_id,
        playstyle = %profile.playstyle,
        role = %profile.preferred_role,
        map = %profile.favorite_map,
        "Processing prediction request"
    );

    let prediction = state.recommender.recommend(&profile).map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "Prediction failed");
        AppError::from(e)
    })?;

    tracing::info!(
        request_id = %request_id,
        agent = %prediction.recommended_agent,
        sens_800 = prediction.recommended_sens_800,
        "Prediction completed"
    );

    Ok(Json(prediction))
}
