use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the pipeline core
///
/// Module bodies return `anyhow::Error`; the core keeps that value untouched
/// inside [`EngineError::Module`] so the full cause chain reaches the process
/// boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Orchestration '{orchestration}' could not be resolved: {message}")]
    Resolution {
        code: u16,
        message: String,
        orchestration: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Bootstrap failed: {message}")]
    Bootstrap {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Module '{module}' failed: {source}")]
    Module {
        code: u16,
        module: String,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    /// Create a configuration error with specific code and settings path
    pub fn config_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a resolution error for the named orchestration
    pub fn resolution(code: u16, orchestration: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            code,
            message: message.into(),
            orchestration: orchestration.into(),
            source: None,
        }
    }

    /// Create a bootstrap error with specific code and path
    pub fn bootstrap(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Bootstrap {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Wrap the error a module returned from `run`
    pub fn module(module: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Module {
            code: ErrorCode::MODULE_FAILED,
            module: module.into(),
            source,
        }
    }

    /// Wrap the error a module factory returned
    pub fn module_construction(module: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Module {
            code: ErrorCode::MODULE_CONSTRUCTION_FAILED,
            module: module.into(),
            source,
        }
    }

    /// Add a source error to this error
    ///
    /// Module errors already carry their source and are returned as-is.
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Resolution { source: src, .. }
            | Self::Bootstrap { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Module { .. } => {}
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Resolution { .. } => 2,
            Self::Bootstrap { .. } => 3,
            Self::Module { .. } => 4,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Resolution { code, .. }
            | Self::Bootstrap { code, .. }
            | Self::Module { code, .. } => *code,
        }
    }

    /// Name of the failing module, if this is a module error
    pub fn module_name(&self) -> Option<&str> {
        match self {
            Self::Module { module, .. } => Some(module),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Resolution {
                message,
                orchestration,
                ..
            } => format!("Cannot run orchestration '{}': {}", orchestration, message),
            Self::Bootstrap { message, path, .. } => match path {
                Some(p) => format!("Could not prepare run output at {}: {}", p.display(), message),
                None => format!("Could not prepare run output: {}", message),
            },
            Self::Module { module, source, .. } => {
                format!("Module '{}' failed: {}", module, source)
            }
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut out = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            out.push_str(&format!("\n  caused by: {}", cause));
            current = cause.source();
        }
        out
    }
}

/// Type alias for Results using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
