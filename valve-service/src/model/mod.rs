//! Model loading and inference
//!
//! The classifier is an opaque pre-trained ONNX artifact: one aligned
//! `(1, L, 2)` cycle in, a 4-class probability vector out. Class 3 is the
//! reserved "optimal" class; everything else maps to "non-optimal".

pub mod classifier;
pub mod metadata;

pub use classifier::{Prediction, ValveModel};
pub use metadata::ModelMetadata;
