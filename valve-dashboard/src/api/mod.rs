//! HTTP client for the prediction service

mod client;

pub use client::{ApiClient, ApiError, Prediction};
