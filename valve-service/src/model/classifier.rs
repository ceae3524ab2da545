//! ONNX classifier wrapper and decision rule

use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::registry::ModelArtifact;

use super::metadata::{ModelMetadata, NUM_CLASSES, OPTIMAL_CLASS};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to load model: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Run(String),

    #[error("model emitted {0} classes, expected {NUM_CLASSES}")]
    BadOutput(usize),
}

/// Condition label derived from the 4-class distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValveCondition {
    Optimal,
    NonOptimal,
}

impl std::fmt::Display for ValveCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValveCondition::Optimal => "optimal",
            ValveCondition::NonOptimal => "non-optimal",
        })
    }
}

/// Prediction output
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub valve_condition: ValveCondition,
    pub confidence: f32,
}

/// Apply the deployment's decision rule to a class probability vector.
///
/// The condition is optimal iff the argmax lands on the reserved optimal
/// class. Confidence for the non-optimal case is `1 - P(optimal)`, not the
/// max over the non-optimal classes; the asymmetry matches the trained
/// deployment and must stay that way.
pub fn classify(probs: &[f32]) -> Result<Prediction, InferenceError> {
    if probs.len() != NUM_CLASSES {
        return Err(InferenceError::BadOutput(probs.len()));
    }

    let (argmax, max) = probs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
            if p > best.1 {
                (i, p)
            } else {
                best
            }
        });

    if argmax == OPTIMAL_CLASS {
        Ok(Prediction {
            valve_condition: ValveCondition::Optimal,
            confidence: max,
        })
    } else {
        Ok(Prediction {
            valve_condition: ValveCondition::NonOptimal,
            confidence: 1.0 - probs[OPTIMAL_CLASS],
        })
    }
}

/// Loaded model artifact plus its registry metadata.
///
/// The session is the only shared state in the process. `ort` needs `&mut`
/// to run, so it sits behind a mutex and each request takes it for the
/// duration of one forward pass.
pub struct ValveModel {
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl ValveModel {
    /// Build a session from the fetched artifact bytes.
    pub fn load(artifact: ModelArtifact) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .map_err(|e| InferenceError::Load(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(e.to_string()))?
            .commit_from_memory(&artifact.bytes)
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            metadata: artifact.metadata,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Run the forward pass on one aligned cycle, returning the class
    /// probability vector.
    pub fn predict(&self, input: Array3<f32>) -> Result<Vec<f32>, InferenceError> {
        let mut session = self.session.lock();

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Run("model defines no output".to_string()))?;

        let input_tensor =
            Value::from_array(input).map_err(|e| InferenceError::Run(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| InferenceError::Run("model produced no output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        Ok(output_tensor.1.to_vec())
    }

    /// Classify one aligned cycle end to end.
    pub fn predict_condition(&self, input: Array3<f32>) -> Result<Prediction, InferenceError> {
        let probs = self.predict(input)?;
        classify(&probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_when_argmax_is_reserved_class() {
        let prediction = classify(&[0.1, 0.1, 0.1, 0.7]).unwrap();
        assert_eq!(prediction.valve_condition, ValveCondition::Optimal);
        assert!((prediction.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn non_optimal_confidence_is_one_minus_optimal_mass() {
        // NOT the max over the non-optimal classes (which would be 0.6)
        let prediction = classify(&[0.6, 0.1, 0.1, 0.2]).unwrap();
        assert_eq!(prediction.valve_condition, ValveCondition::NonOptimal);
        assert!((prediction.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn ties_resolve_to_the_first_class() {
        // argmax semantics: the first of equal maxima wins, as in numpy
        let prediction = classify(&[0.4, 0.1, 0.1, 0.4]).unwrap();
        assert_eq!(prediction.valve_condition, ValveCondition::NonOptimal);
    }

    #[test]
    fn wrong_class_count_is_rejected() {
        let err = classify(&[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, InferenceError::BadOutput(2)));
    }

    #[test]
    fn condition_serializes_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&ValveCondition::Optimal).unwrap(),
            r#""optimal""#
        );
        assert_eq!(
            serde_json::to_string(&ValveCondition::NonOptimal).unwrap(),
            r#""non-optimal""#
        );
    }
}
