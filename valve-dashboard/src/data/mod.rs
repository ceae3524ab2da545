//! Cycle data loading and stream alignment
//!
//! The hydraulic rig records two sensor streams per 60 s cycle at different
//! rates (FS1 flow at 10 Hz, PS2 pressure at 100 Hz) plus one condition
//! profile row per cycle. This module reconciles the two rates into a single
//! fixed-length two-channel tensor per cycle, upsampling the slow stream or
//! downsampling the fast one depending on what the deployed model expects.

mod loader;
mod resample;

pub use loader::{load_dataset, DataError, DatasetFiles};
pub use resample::ResamplingMethod;
