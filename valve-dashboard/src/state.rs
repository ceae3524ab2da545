//! Session state
//!
//! One dashboard session holds the aligned dataset built at startup plus the
//! last prediction received. Kept as an explicit value handed to whoever
//! needs it, never process-global state.

use ndarray::{Array1, Array3, ArrayView2, Axis};

use crate::api::Prediction;
use crate::data::ResamplingMethod;

pub struct SessionState {
    data: Array3<f64>,
    target: Array1<i64>,
    method: ResamplingMethod,
    prediction: Option<Prediction>,
}

impl SessionState {
    pub fn new(data: Array3<f64>, target: Array1<i64>, method: ResamplingMethod) -> Self {
        Self {
            data,
            target,
            method,
            prediction: None,
        }
    }

    pub fn num_cycles(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn channel_len(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn method(&self) -> ResamplingMethod {
        self.method
    }

    /// One cycle's (L, 2) slice, if the index is in range.
    pub fn cycle(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        (index < self.num_cycles()).then(|| self.data.index_axis(Axis(0), index))
    }

    /// Recorded condition code for one cycle.
    pub fn label(&self, index: usize) -> Option<i64> {
        self.target.get(index).copied()
    }

    pub fn record_prediction(&mut self, prediction: Prediction) {
        self.prediction = Some(prediction);
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }
}
