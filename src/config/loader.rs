use super::{Settings, DATE_FORMAT};
use crate::error::{EngineError, ErrorCode, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings file used when neither `--config` nor the environment names one
pub const DEFAULT_SETTINGS_FILE: &str = "config.yaml";

/// Environment variable that overrides the default settings path
pub const SETTINGS_PATH_ENV: &str = "AL_ENGINE_CONFIG";

/// Pick the settings path: explicit argument, then environment, then default
pub fn resolve_settings_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(SETTINGS_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// Read, parse and validate the settings document
pub fn load_settings(path: &Path) -> Result<Settings> {
    info!("Loading in config file from {}...", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            "Cannot read settings file",
            Some(path.to_path_buf()),
        )
        .with_source(e)
    })?;

    let settings: Settings = serde_yaml::from_str(&content).map_err(|e| {
        let message = e.to_string();
        let code = if message.contains("missing field") {
            ErrorCode::CONFIG_MISSING_REQUIRED
        } else {
            ErrorCode::CONFIG_INVALID_YAML
        };
        EngineError::config_with_code(code, message, Some(path.to_path_buf()))
    })?;

    validate_settings(&settings).map_err(|e| match e {
        EngineError::Config {
            code,
            message,
            source,
            ..
        } => EngineError::Config {
            code,
            message,
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    })?;

    debug!(
        "Settings loaded: orchestration folder [{}], runs root [{}], data root [{}]",
        settings.orchestration.folder_path.display(),
        settings.runs.root.display(),
        settings.data.root.display()
    );
    Ok(settings)
}

/// Semantic checks serde cannot express
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.orchestration.folder_path.as_os_str().is_empty() {
        return Err(invalid("orchestration.folder_path must not be empty"));
    }

    if NaiveDate::parse_from_str(&settings.model.data.training_end_date, DATE_FORMAT).is_err() {
        return Err(invalid(format!(
            "model.data.training_end_date '{}' is not a {} date",
            settings.model.data.training_end_date, DATE_FORMAT
        )));
    }

    if settings.model.data.target.trim().is_empty() {
        return Err(invalid("model.data.target must not be empty"));
    }

    let alpha = settings.model.linear.ridge_alpha;
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(invalid(format!(
            "model.linear.ridge_alpha must be a non-negative number, got {alpha}"
        )));
    }

    for (index, source) in settings.preprocess.sources.iter().enumerate() {
        if source.columns.is_empty() {
            return Err(invalid(format!(
                "preprocess.sources[{index}] ({}) maps no columns",
                source.file.display()
            )));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"
orchestration:
  folder_path: orchestrate
model:
  data:
    training_end_date: "2021-06-01"
    shift: -1
"#;

    fn write_settings(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_settings() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, VALID);

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.model.data.shift, -1);
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_settings(&dir.path().join("absent.yaml")).unwrap_err();

        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_required_key_names_the_key() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(
            &dir,
            r#"
orchestration:
  folder_path: orchestrate
model:
  data:
    training_end_date: "2021-06-01"
"#,
        );

        let err = load_settings(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert!(err.to_string().contains("shift"), "got: {err}");
        assert!(err.user_message().contains("config.yaml"));
    }

    #[test]
    fn test_bad_split_date_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, &VALID.replace("2021-06-01", "01/06/2021"));

        let err = load_settings(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
        assert!(err.to_string().contains("training_end_date"));
    }

    #[test]
    fn test_negative_ridge_alpha_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(
            &dir,
            &format!("{VALID}  linear:\n    ridge_alpha: -0.5\n"),
        );

        let err = load_settings(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/explicit.yaml");
        assert_eq!(resolve_settings_path(Some(explicit.clone())), explicit);
    }
}
