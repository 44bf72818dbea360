use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Human-readable timestamp format used in run banners
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sortable day bucket grouping the runs started on the same date
pub const DATE_BUCKET_FORMAT: &str = "%Y%m%d";

pub const LOGS_DIR: &str = "logs";
pub const PLOTS_DIR: &str = "plots";
pub const LOG_FILE: &str = "run.log";
pub const METADATA_FILE: &str = "run.json";

/// Identity and on-disk layout of one pipeline invocation
///
/// Built once at bootstrap and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub start_time: DateTime<Local>,
    pub date_bucket: String,
    pub run_folder: PathBuf,
    pub log_file: PathBuf,
    pub plots_dir: PathBuf,
}

impl RunMetadata {
    /// Fresh identity: random v4 id, current wall-clock time
    pub fn create(runs_root: &Path) -> Self {
        Self::with_identity(runs_root, Uuid::new_v4(), Local::now())
    }

    /// Derive the layout for a given id and start time
    pub fn with_identity(runs_root: &Path, run_id: Uuid, start_time: DateTime<Local>) -> Self {
        let date_bucket = start_time.format(DATE_BUCKET_FORMAT).to_string();
        let run_folder = runs_root.join(&date_bucket).join(run_id.to_string());
        let log_file = run_folder.join(LOGS_DIR).join(LOG_FILE);
        let plots_dir = run_folder.join(PLOTS_DIR);

        Self {
            run_id,
            start_time,
            date_bucket,
            run_folder,
            log_file,
            plots_dir,
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.run_folder.join(LOGS_DIR)
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.run_folder.join(METADATA_FILE)
    }

    /// Start time rendered for logs
    pub fn start_time_display(&self) -> String {
        self.start_time.format(TIMESTAMP_FORMAT).to_string()
    }
}
