//! Cycle prediction handler

use axum::{extract::State, Json};
use ndarray::Array3;
use serde::Deserialize;

use crate::model::Prediction;
use crate::{AppError, AppResult, AppState};

/// Request body for `/predict_from_cycle`.
///
/// `input_data` is one aligned cycle as produced by the dashboard's
/// resampler: either a flat `L * 2` array or a nested `L x 2` one.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub input_data: CycleData,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CycleData {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

pub async fn predict_from_cycle(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> AppResult<Json<Prediction>> {
    let expected_len = state.model.metadata().input_length;
    let input = reshape_input(request.input_data, expected_len)?;

    let prediction = state
        .model
        .predict_condition(input)
        .map_err(|e| AppError::InferenceError(e.to_string()))?;

    Ok(Json(prediction))
}

/// Validate and reshape the payload into the model's (1, L, 2) input tensor.
pub fn reshape_input(data: CycleData, expected_len: usize) -> Result<Array3<f32>, AppError> {
    let flat = match data {
        CycleData::Flat(values) => values,
        CycleData::Nested(rows) => {
            let width = rows.first().map(Vec::len).unwrap_or(0);
            if rows.iter().any(|row| row.len() != width) {
                return Err(AppError::ValidationError(
                    "input_data rows have inconsistent lengths".to_string(),
                ));
            }
            rows.into_iter().flatten().collect()
        }
    };

    if flat.len() != expected_len * 2 {
        return Err(AppError::ValidationError(format!(
            "input_data has {} values, cannot reshape to (1, {}, 2)",
            flat.len(),
            expected_len
        )));
    }

    Array3::from_shape_vec((1, expected_len, 2), flat)
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_payload_reshapes() {
        let input = reshape_input(CycleData::Flat(vec![0.0; 12]), 6).unwrap();
        assert_eq!(input.shape(), &[1, 6, 2]);
    }

    #[test]
    fn nested_payload_reshapes_row_major() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let input = reshape_input(CycleData::Nested(rows), 3).unwrap();
        assert_eq!(input.shape(), &[1, 3, 2]);
        // channel 0 holds the first value of each pair
        assert_eq!(input[[0, 1, 0]], 2.0);
        assert_eq!(input[[0, 1, 1]], 20.0);
    }

    #[test]
    fn wrong_value_count_is_a_validation_error() {
        let err = reshape_input(CycleData::Flat(vec![0.0; 11]), 6).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn ragged_nesting_is_a_validation_error() {
        let rows = vec![vec![1.0, 10.0], vec![2.0]];
        let err = reshape_input(CycleData::Nested(rows), 2).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn untagged_payload_accepts_both_shapes() {
        let flat: PredictRequest = serde_json::from_str(r#"{"input_data": [1.0, 2.0]}"#).unwrap();
        assert!(matches!(flat.input_data, CycleData::Flat(_)));

        let nested: PredictRequest =
            serde_json::from_str(r#"{"input_data": [[1.0, 2.0]]}"#).unwrap();
        assert!(matches!(nested.input_data, CycleData::Nested(_)));
    }
}
