use crate::error::{EngineError, ErrorCode, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// File extensions tried, in order, when discovering a definition by name
pub const DEFINITION_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Ordered module names making up one pipeline
///
/// Accepted on disk either as a bare list or as a mapping with a `modules`
/// (or `list_modules`) field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationDefinition {
    /// Modules to execute in order
    pub modules: Vec<String>,
}

impl<'de> Deserialize<'de> for OrchestrationDefinition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DefinitionHelper {
            Modules(Vec<String>),
            WithModulesField {
                #[serde(alias = "list_modules")]
                modules: Vec<String>,
            },
        }

        let helper = DefinitionHelper::deserialize(deserializer)?;
        let modules = match helper {
            DefinitionHelper::Modules(modules) => modules,
            DefinitionHelper::WithModulesField { modules } => modules,
        };

        Ok(OrchestrationDefinition { modules })
    }
}

impl OrchestrationDefinition {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a definition document, naming `orchestration` in any error
    pub fn parse(orchestration: &str, content: &str) -> Result<Self> {
        let definition: Self = serde_yaml::from_str(content).map_err(|e| {
            EngineError::resolution(
                ErrorCode::ORCHESTRATION_INVALID_SYNTAX,
                orchestration,
                "definition does not expose an ordered `modules` list",
            )
            .with_source(e)
        })?;
        definition.validate(orchestration)?;
        Ok(definition)
    }

    /// Read and parse a definition file
    pub fn from_file(orchestration: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::resolution(
                ErrorCode::ORCHESTRATION_NOT_FOUND,
                orchestration,
                format!("cannot read {}", path.display()),
            )
            .with_source(e)
        })?;
        Self::parse(orchestration, &content)
    }

    fn validate(&self, orchestration: &str) -> Result<()> {
        if self.modules.is_empty() {
            return Err(EngineError::resolution(
                ErrorCode::ORCHESTRATION_INVALID_SYNTAX,
                orchestration,
                "definition lists no modules",
            ));
        }
        if let Some(blank) = self.modules.iter().position(|m| m.trim().is_empty()) {
            return Err(EngineError::resolution(
                ErrorCode::ORCHESTRATION_INVALID_SYNTAX,
                orchestration,
                format!("module entry {} is blank", blank + 1),
            ));
        }
        Ok(())
    }
}
