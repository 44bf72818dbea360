//! Run bootstrap
//!
//! Creates the run folder layout, attaches the run log and publishes the
//! run metadata alongside the settings.

use crate::app::logging::{init_run_logging, LoggingGuard};
use crate::config::Settings;
use crate::error::{EngineError, ErrorCode, Result};
use crate::run::{RunContext, RunMetadata};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A prepared run: the shared context and the logging scope bound to it
pub struct Bootstrapped {
    pub context: RunContext,
    pub logging: LoggingGuard,
}

/// Create a fresh run identity under the configured runs root and prepare it
pub fn bootstrap(settings: Arc<Settings>, verbose: u8) -> Result<Bootstrapped> {
    let run = RunMetadata::create(&settings.runs.root);
    bootstrap_run(settings, run, verbose)
}

/// Prepare the given run identity
///
/// Nothing is logged to the run sinks and no subscriber is installed until
/// every directory and the log file exist.
pub fn bootstrap_run(settings: Arc<Settings>, run: RunMetadata, verbose: u8) -> Result<Bootstrapped> {
    create_run_layout(&run)?;
    write_run_metadata(&run)?;

    let logging = init_run_logging(verbose, &run.log_file).map_err(|e| {
        EngineError::bootstrap(
            ErrorCode::BOOTSTRAP_LOG_FILE,
            "cannot open run log file",
            Some(run.log_file.clone()),
        )
        .with_source(e)
    })?;

    info!("Bootstrap task in progress...");
    debug!(
        "\n###########################\nrun id: {}\nrun time: {}\nrun folder created at: {}\nlog file stored in: {}\n###########################",
        run.run_id,
        run.start_time_display(),
        run.run_folder.display(),
        run.log_file.display()
    );

    Ok(Bootstrapped {
        context: RunContext::new(settings, run),
        logging,
    })
}

fn create_run_layout(run: &RunMetadata) -> Result<()> {
    if let Some(bucket) = run.run_folder.parent() {
        std::fs::create_dir_all(bucket).map_err(|e| directory_error(bucket, e))?;
    }

    std::fs::create_dir(&run.run_folder).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            EngineError::bootstrap(
                ErrorCode::BOOTSTRAP_RUN_COLLISION,
                format!("run folder for run {} already exists", run.run_id),
                Some(run.run_folder.clone()),
            )
            .with_source(e)
        } else {
            directory_error(&run.run_folder, e)
        }
    })?;

    let logs_dir = run.logs_dir();
    std::fs::create_dir(&logs_dir).map_err(|e| directory_error(&logs_dir, e))?;
    std::fs::create_dir(&run.plots_dir).map_err(|e| directory_error(&run.plots_dir, e))?;
    Ok(())
}

fn write_run_metadata(run: &RunMetadata) -> Result<()> {
    let path = run.metadata_file();
    let json = serde_json::to_vec_pretty(run).map_err(|e| {
        EngineError::bootstrap(
            ErrorCode::BOOTSTRAP_GENERIC,
            "cannot serialize run metadata",
            Some(path.clone()),
        )
        .with_source(e)
    })?;
    std::fs::write(&path, json).map_err(|e| {
        EngineError::bootstrap(
            ErrorCode::BOOTSTRAP_GENERIC,
            "cannot write run metadata",
            Some(path.clone()),
        )
        .with_source(e)
    })
}

fn directory_error(path: &Path, err: std::io::Error) -> EngineError {
    EngineError::bootstrap(
        ErrorCode::BOOTSTRAP_DIRECTORY,
        format!("cannot create directory ({})", err.kind()),
        Some(path.to_path_buf()),
    )
    .with_source(err)
}
