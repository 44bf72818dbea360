//! Application module
//!
//! This module contains application-level functionality including:
//! - Configuration handling
//! - Logging setup
//! - Run bootstrap
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

// Re-export main application functions
pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::{init_console_logging, init_run_logging, LoggingGuard};
pub use runtime::{bootstrap, bootstrap_run, Bootstrapped};
