//! Logging configuration and initialization
//!
//! Sinks are installed as the thread's default subscriber and removed again
//! when the returned [`LoggingGuard`] is dropped, so a failed run never leaves
//! a half-configured logger behind.

use crate::app::config::log_level_for;
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::{debug, trace};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// Keeps the installed sinks alive; flushes the run log on drop
pub struct LoggingGuard {
    log_file: Option<Arc<File>>,
    _default: DefaultGuard,
}

impl LoggingGuard {
    /// Whether a run log file sink is attached
    pub fn has_log_file(&self) -> bool {
        self.log_file.is_some()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.log_file {
            let _ = file.sync_all();
        }
    }
}

fn console_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level_for(verbose)))
}

fn file_filter(verbose: u8) -> EnvFilter {
    // The run log always keeps debug detail for later diagnosis
    EnvFilter::new(if verbose >= 2 { "trace" } else { "debug" })
}

fn console_layer<S>(verbose: u8) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .with_filter(console_filter(verbose))
}

/// Console-only logging used before a run folder exists
pub fn init_console_logging(verbose: u8) -> LoggingGuard {
    let subscriber = tracing_subscriber::registry().with(console_layer(verbose));
    let guard = tracing::subscriber::set_default(subscriber);

    debug!("al-engine started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    LoggingGuard {
        log_file: None,
        _default: guard,
    }
}

/// Console plus plain-text file logging bound to a run's log file
///
/// The file is opened before anything is installed; if that fails the
/// current subscriber is left untouched.
pub fn init_run_logging(verbose: u8, log_file: &Path) -> std::io::Result<LoggingGuard> {
    let file = Arc::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?,
    );

    let file_layer = fmt::layer()
        .with_writer(file.clone())
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(file_filter(verbose));

    let subscriber = tracing_subscriber::registry()
        .with(console_layer(verbose))
        .with(file_layer);
    let guard = tracing::subscriber::set_default(subscriber);

    Ok(LoggingGuard {
        log_file: Some(file),
        _default: guard,
    })
}
