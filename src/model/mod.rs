//! Forecasting models of the `model` orchestration

pub mod linear_model;
pub mod measurement;
pub mod plot;

pub use linear_model::{LinearFit, LinearModel};
pub use measurement::PerformanceMetrics;
