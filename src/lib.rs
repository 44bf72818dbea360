//! # al-engine
//!
//! A batch pipeline runner for aluminium price forecasting studies.
//!
//! ## Usage
//!
//! ```bash
//! al-engine [-v...] [-c config.yaml] <ORCHESTRATION>
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging, run bootstrap and fatal error reporting for the binary
//! - `config` - Settings document and orchestration definitions
//! - `data` - Date-indexed frames and the conventional file locations for them
//! - `error` - Error types with numbered codes and exit codes
//! - `model` - Linear forecasting models, metrics and plots
//! - `module` - The module contract, its lifecycle wrapper and the module registry
//! - `orchestrator` - Orchestration resolution and sequential, fail-fast execution
//! - `processing` - Cleaning, scaling, differencing and train/test preparation
//! - `run` - Run identity and the read-only context shared with modules
//! - `testing` - Spy modules and fixtures for tests
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod module;
pub mod orchestrator;
pub mod processing;
pub mod run;

pub mod testing;
