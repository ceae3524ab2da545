//! Resampling-method handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ResamplingMethodResponse {
    resampling_method: &'static str,
}

/// Report which resampling method the loaded model was trained for, so the
/// dashboard aligns its cycle data the same way.
pub async fn get_resampling_method(
    State(state): State<AppState>,
) -> Json<ResamplingMethodResponse> {
    Json(ResamplingMethodResponse {
        resampling_method: state.model.metadata().resampling_method.as_str(),
    })
}
