//! Model metadata
//!
//! The resampling method a model was trained for is stored in an explicit
//! JSON sidecar next to the artifact. Recovering it from the artifact's
//! naming convention is kept only as a fallback for legacy registry entries,
//! and a model that declares no method either way is a startup error.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Marker segment in legacy artifact identifiers, e.g.
/// `valve_cnn__Resampling_down__v2`.
const LEGACY_METHOD_MARKER: &str = "Resampling";

/// Channel length models trained on `up`-aligned data expect (100 Hz width).
pub const UP_INPUT_LENGTH: usize = 6000;
/// Channel length models trained on `down`-aligned data expect (10 Hz width).
pub const DOWN_INPUT_LENGTH: usize = 600;

/// Number of condition classes the deployed models emit.
pub const NUM_CLASSES: usize = 4;
/// Index of the reserved "optimal" class in the output distribution.
pub const OPTIMAL_CLASS: usize = 3;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unrecognized resampling method '{0}' (expected 'up' or 'down')")]
    UnknownMethod(String),

    #[error("model '{0}' declares no resampling method and its identifier does not encode one")]
    MissingMethod(String),

    #[error("failed to decode metadata sidecar: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Strategy the deployed model's training data was aligned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingMethod {
    /// Low-rate stream interpolated up to the high-rate length
    Up,
    /// High-rate stream resampled down to the low-rate length
    Down,
}

impl ResamplingMethod {
    /// Channel length of the (1, L, 2) input a model trained with this
    /// method expects.
    pub fn input_length(self) -> usize {
        match self {
            ResamplingMethod::Up => UP_INPUT_LENGTH,
            ResamplingMethod::Down => DOWN_INPUT_LENGTH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResamplingMethod::Up => "up",
            ResamplingMethod::Down => "down",
        }
    }
}

impl fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResamplingMethod {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ResamplingMethod::Up),
            "down" => Ok(ResamplingMethod::Down),
            other => Err(MetadataError::UnknownMethod(other.to_string())),
        }
    }
}

/// Raw sidecar document as stored in the registry.
#[derive(Debug, Deserialize)]
struct Sidecar {
    name: Option<String>,
    resampling_method: String,
    input_length: Option<usize>,
}

/// Metadata resolved for a loaded model artifact.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub name: String,
    pub resampling_method: ResamplingMethod,
    /// Channel length of the (1, L, 2) input tensor
    pub input_length: usize,
}

impl ModelMetadata {
    /// Decode the JSON sidecar stored next to the artifact.
    pub fn from_sidecar_json(model_uri: &str, raw: &[u8]) -> Result<Self, MetadataError> {
        let sidecar: Sidecar = serde_json::from_slice(raw)?;
        let method: ResamplingMethod = sidecar.resampling_method.parse()?;

        Ok(Self {
            name: sidecar.name.unwrap_or_else(|| artifact_name(model_uri)),
            resampling_method: method,
            input_length: sidecar.input_length.unwrap_or_else(|| method.input_length()),
        })
    }

    /// Fallback for registry entries without a sidecar: recover the method
    /// from the artifact identifier naming convention.
    pub fn from_identifier(model_uri: &str) -> Result<Self, MetadataError> {
        let token = method_token(model_uri)
            .ok_or_else(|| MetadataError::MissingMethod(model_uri.to_string()))?;
        let method: ResamplingMethod = token.parse()?;

        Ok(Self {
            name: artifact_name(model_uri),
            resampling_method: method,
            input_length: method.input_length(),
        })
    }
}

/// Legacy naming convention: `__`-separated segments, the one containing
/// `Resampling` carries the method after its final `_`.
fn method_token(identifier: &str) -> Option<&str> {
    identifier
        .split("__")
        .find(|segment| segment.contains(LEGACY_METHOD_MARKER))
        .and_then(|segment| segment.rsplit('_').next())
}

fn artifact_name(model_uri: &str) -> String {
    model_uri
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(model_uri)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_with_marker_yields_method() {
        let meta = ModelMetadata::from_identifier("models/valve_cnn__Resampling_down__v2").unwrap();
        assert_eq!(meta.resampling_method, ResamplingMethod::Down);
        assert_eq!(meta.input_length, DOWN_INPUT_LENGTH);
        assert_eq!(meta.name, "valve_cnn__Resampling_down__v2");
    }

    #[test]
    fn identifier_up_method() {
        let meta = ModelMetadata::from_identifier("valve_cnn__Resampling_up").unwrap();
        assert_eq!(meta.resampling_method, ResamplingMethod::Up);
        assert_eq!(meta.input_length, UP_INPUT_LENGTH);
    }

    #[test]
    fn identifier_without_marker_is_an_error() {
        let err = ModelMetadata::from_identifier("models/valve_cnn__v2").unwrap_err();
        assert!(matches!(err, MetadataError::MissingMethod(_)));
    }

    #[test]
    fn identifier_with_garbage_method_is_an_error() {
        let err = ModelMetadata::from_identifier("valve__Resampling_sideways").unwrap_err();
        assert!(matches!(err, MetadataError::UnknownMethod(ref m) if m == "sideways"));
    }

    #[test]
    fn sidecar_decodes_with_defaults() {
        let raw = br#"{"resampling_method": "down"}"#;
        let meta = ModelMetadata::from_sidecar_json("registry/model.onnx", raw).unwrap();
        assert_eq!(meta.resampling_method, ResamplingMethod::Down);
        assert_eq!(meta.input_length, DOWN_INPUT_LENGTH);
        assert_eq!(meta.name, "model.onnx");
    }

    #[test]
    fn sidecar_explicit_fields_win() {
        let raw = br#"{"name": "valve-cnn", "resampling_method": "up", "input_length": 6000}"#;
        let meta = ModelMetadata::from_sidecar_json("model.onnx", raw).unwrap();
        assert_eq!(meta.name, "valve-cnn");
        assert_eq!(meta.resampling_method, ResamplingMethod::Up);
        assert_eq!(meta.input_length, 6000);
    }

    #[test]
    fn sidecar_rejects_unknown_method() {
        let raw = br#"{"resampling_method": "sideways"}"#;
        let err = ModelMetadata::from_sidecar_json("model.onnx", raw).unwrap_err();
        assert!(matches!(err, MetadataError::UnknownMethod(_)));
    }
}
