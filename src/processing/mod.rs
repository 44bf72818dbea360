//! Data preparation modules of the `preprocess` orchestration
//!
//! Each module reads the previous step's file from the data root and writes
//! its own, so any of them can be rerun on its own through a custom
//! orchestration.

pub mod clean_engineer;
pub mod differencing;
pub mod prepare_training;
pub mod scaling;

pub use clean_engineer::CleanEngineer;
pub use differencing::Differencing;
pub use prepare_training::{PrepareTraining, SHIFTED_TARGET};
pub use scaling::Scaling;
