//! Error handling utilities
//!
//! This module provides centralized error handling for the binary.

use crate::error::{describe_error_code, EngineError};
use tracing::error;

/// Exit code used for errors that are not an [`EngineError`]
pub const GENERAL_ERROR: i32 = 1;

/// Exit code the process should use for `error`
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<EngineError>()
        .map(EngineError::exit_code)
        .unwrap_or(GENERAL_ERROR)
}

/// `Error kind [E####]: <description of the code>`
pub fn error_kind_line(error: &EngineError) -> String {
    format!(
        "Error kind [E{:04}]: {}",
        error.code(),
        describe_error_code(error.code())
    )
}

/// Log a fatal error, print it for the user and exit
///
/// - `verbose = 0`: user-facing message only
/// - `verbose >= 1`: the full cause chain as well
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    if let Some(engine_err) = error.downcast_ref::<EngineError>() {
        eprintln!("Error [E{:04}]: {}", engine_err.code(), engine_err.user_message());

        if verbose >= 1 {
            eprintln!("\n{}", error_kind_line(engine_err));
            eprintln!("\nContext Chain:\n{}", engine_err.developer_message());
        }
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_engine_errors_keep_their_exit_code() {
        let err = anyhow::Error::new(EngineError::module("Scaling", anyhow::anyhow!("boom")));
        assert_eq!(exit_code_for(&err), 4);

        let err = anyhow::Error::new(EngineError::resolution(
            ErrorCode::ORCHESTRATION_NOT_FOUND,
            "nope",
            "not found",
        ));
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_error_kind_line_describes_the_code() {
        let err = EngineError::bootstrap(ErrorCode::BOOTSTRAP_RUN_COLLISION, "exists", None);
        assert_eq!(
            error_kind_line(&err),
            "Error kind [E3005]: Run folder already exists"
        );
    }

    #[test]
    fn test_other_errors_use_general_exit_code() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), GENERAL_ERROR);
    }
}
