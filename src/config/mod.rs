//! Pipeline settings
//!
//! The settings document is read once at process start and never mutated.
//! Every module receives it through the shared [`crate::run::RunContext`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod loader;
pub mod orchestration;

pub use loader::{load_settings, resolve_settings_path, DEFAULT_SETTINGS_FILE, SETTINGS_PATH_ENV};
pub use orchestration::OrchestrationDefinition;

/// Format of every date stored in settings and in intermediate CSV files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub orchestration: OrchestrationSettings,
    pub model: ModelSettings,
    #[serde(default)]
    pub runs: RunsSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub preprocess: PreprocessSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationSettings {
    /// Folder holding `<name>.yaml` orchestration definitions
    pub folder_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunsSettings {
    #[serde(default = "default_runs_root")]
    pub root: PathBuf,
}

impl Default for RunsSettings {
    fn default() -> Self {
        Self {
            root: default_runs_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_data_root")]
    pub root: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            root: default_data_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub data: ModelDataSettings,
    #[serde(default)]
    pub linear: LinearSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDataSettings {
    /// Rows dated strictly before this day form the training set
    pub training_end_date: String,
    /// Rows to shift the target by when building `SHIFTED_PRICE`
    pub shift: i64,
    #[serde(default = "default_target")]
    pub target: String,
}

impl ModelDataSettings {
    /// The split date, already checked by the loader
    pub fn training_end(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.training_end_date, DATE_FORMAT).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSettings {
    #[serde(default = "default_ridge_alpha")]
    pub ridge_alpha: f64,
}

impl Default for LinearSettings {
    fn default() -> Self {
        Self {
            ridge_alpha: default_ridge_alpha(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessSettings {
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
    #[serde(default)]
    pub differencing: DifferencingSettings,
}

/// One raw input joined by the cleaning module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Path relative to the data root
    pub file: PathBuf,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_source_date_format")]
    pub date_format: String,
    /// Source header -> output column name
    pub columns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifferencingSettings {
    /// Columns to difference; empty means every numeric column not passed through
    #[serde(default)]
    pub columns: Vec<String>,
    /// Columns carried over without differencing
    #[serde(default)]
    pub passthrough: Vec<String>,
}

fn default_runs_root() -> PathBuf {
    PathBuf::from("runs")
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_target() -> String {
    "AL_PRICE".to_string()
}

fn default_ridge_alpha() -> f64 {
    1.0
}

fn default_date_column() -> String {
    "date".to_string()
}

fn default_source_date_format() -> String {
    DATE_FORMAT.to_string()
}
