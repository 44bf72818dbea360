/// Error code registry for al-engine
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Bootstrap errors
/// - 4000-4999: Module execution errors
/// - 5000-5999: Orchestration resolution errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;

    // Bootstrap errors (3000-3999)
    pub const BOOTSTRAP_GENERIC: u16 = 3000;
    pub const BOOTSTRAP_DIRECTORY: u16 = 3001;
    pub const BOOTSTRAP_RUN_COLLISION: u16 = 3005;
    pub const BOOTSTRAP_LOG_FILE: u16 = 3010;

    // Module execution errors (4000-4999)
    pub const MODULE_FAILED: u16 = 4000;
    pub const MODULE_CONSTRUCTION_FAILED: u16 = 4001;

    // Orchestration resolution errors (5000-5999)
    pub const ORCHESTRATION_NOT_FOUND: u16 = 5001;
    pub const ORCHESTRATION_INVALID_SYNTAX: u16 = 5002;
    pub const ORCHESTRATION_UNKNOWN_MODULE: u16 = 5003;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Settings file not found or unreadable",
        1002 => "Invalid YAML syntax in settings file",
        1004 => "Required settings key is missing",
        1005 => "Invalid value in settings file",

        3000 => "Generic bootstrap error",
        3001 => "Could not create run directory",
        3005 => "Run folder already exists",
        3010 => "Could not open run log file",

        4000 => "Module failed during run",
        4001 => "Module could not be constructed",

        5001 => "Orchestration definition not found",
        5002 => "Orchestration definition is malformed",
        5003 => "Orchestration names an unregistered module",

        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_fall_in_their_category_ranges() {
        for code in [
            ErrorCode::CONFIG_GENERIC,
            ErrorCode::CONFIG_NOT_FOUND,
            ErrorCode::CONFIG_INVALID_YAML,
            ErrorCode::CONFIG_MISSING_REQUIRED,
            ErrorCode::CONFIG_INVALID_VALUE,
        ] {
            assert!((1000..2000).contains(&code));
        }
        assert!((3000..4000).contains(&ErrorCode::BOOTSTRAP_RUN_COLLISION));
        assert!((4000..5000).contains(&ErrorCode::MODULE_FAILED));
        assert!((5000..6000).contains(&ErrorCode::ORCHESTRATION_UNKNOWN_MODULE));
    }

    #[test]
    fn test_describe_known_and_unknown_codes() {
        assert_eq!(
            describe_error_code(ErrorCode::ORCHESTRATION_NOT_FOUND),
            "Orchestration definition not found"
        );
        assert_eq!(describe_error_code(9999), "Unknown error code");
    }
}
