//! Run identity and the shared read-only view handed to modules

use crate::config::Settings;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod metadata;

pub use metadata::RunMetadata;

/// Settings joined with the metadata of the current run
///
/// This is the only state modules share. Both halves are immutable; cloning
/// the context shares them rather than copying.
#[derive(Debug, Clone)]
pub struct RunContext {
    settings: Arc<Settings>,
    run: Arc<RunMetadata>,
}

impl RunContext {
    pub fn new(settings: Arc<Settings>, run: RunMetadata) -> Self {
        Self {
            settings,
            run: Arc::new(run),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self) -> &RunMetadata {
        &self.run
    }

    /// Root of the shared intermediate-data area
    pub fn data_root(&self) -> &Path {
        &self.settings.data.root
    }

    /// `<data_root>/<kind>`, e.g. `data/processed`
    pub fn data_dir(&self, kind: &str) -> PathBuf {
        self.settings.data.root.join(kind)
    }
}
