//! Application configuration
//!
//! Process-level options taken from the command line, as opposed to the
//! pipeline [`Settings`](crate::config::Settings) read from disk.

use crate::config::resolve_settings_path;
use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Settings document to load
    pub settings_path: PathBuf,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8, settings_path: Option<PathBuf>) -> Self {
        Self {
            verbose,
            settings_path: resolve_settings_path(settings_path),
        }
    }
}

/// Console level for a `-v` count
pub fn log_level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_follows_verbosity() {
        assert_eq!(log_level_for(0), "info");
        assert_eq!(log_level_for(1), "debug");
        assert_eq!(log_level_for(2), "trace");
        assert_eq!(log_level_for(7), "trace");
    }

    #[test]
    fn test_explicit_settings_path_is_kept() {
        let config = AppConfig::new(1, Some(PathBuf::from("studies/al.yaml")));
        assert_eq!(config.settings_path, PathBuf::from("studies/al.yaml"));
        assert_eq!(config.verbose, 1);
    }
}
