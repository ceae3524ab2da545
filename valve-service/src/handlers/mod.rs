//! HTTP handlers

pub mod health;
pub mod method;
pub mod predict;
