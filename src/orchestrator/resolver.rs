//! Orchestration lookup by name
//!
//! A name resolves to `<folder>/<name>.yaml` (or `.yml`) when such a file
//! exists, and to the built-in table otherwise. Every module named by the
//! definition must be registered before anything runs.

use crate::config::orchestration::{OrchestrationDefinition, DEFINITION_EXTENSIONS};
use crate::error::{EngineError, ErrorCode, Result};
use crate::model::LinearModel;
use crate::module::{ModuleDescriptor, ModuleRegistry};
use crate::processing::{CleanEngineer, Differencing, PrepareTraining, Scaling};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a resolved orchestration was defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    File(PathBuf),
    Builtin,
}

impl fmt::Display for DefinitionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Builtin => f.write_str("built-in definition"),
        }
    }
}

/// An orchestration ready to execute
#[derive(Debug, Clone)]
pub struct Orchestration {
    pub name: String,
    pub source: DefinitionSource,
    pub modules: Vec<ModuleDescriptor>,
}

impl Orchestration {
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(ModuleDescriptor::name).collect()
    }
}

/// Maps orchestration names to ordered module descriptors
#[derive(Debug, Clone)]
pub struct OrchestrationResolver {
    folder: PathBuf,
    builtins: BTreeMap<String, OrchestrationDefinition>,
}

impl OrchestrationResolver {
    /// Resolver reading definitions from `folder`, with no built-ins
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            builtins: BTreeMap::new(),
        }
    }

    /// Resolver with the `preprocess` and `model` pipelines built in
    pub fn with_defaults(folder: impl Into<PathBuf>) -> Self {
        let mut resolver = Self::new(folder);
        resolver.register_builtin(
            "preprocess",
            OrchestrationDefinition::new([
                CleanEngineer::NAME,
                Scaling::NAME,
                Differencing::NAME,
                PrepareTraining::NAME,
            ]),
        );
        resolver.register_builtin("model", OrchestrationDefinition::new([LinearModel::NAME]));
        resolver
    }

    pub fn register_builtin(&mut self, name: &str, definition: OrchestrationDefinition) -> &mut Self {
        self.builtins.insert(name.to_string(), definition);
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Every name that currently resolves: files in the folder plus built-ins
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builtins.keys().cloned().collect();
        if let Ok(entries) = std::fs::read_dir(&self.folder) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_definition = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| DEFINITION_EXTENSIONS.contains(&e));
                if let (true, Some(stem)) = (is_definition, path.file_stem().and_then(|s| s.to_str())) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }

    /// Find the definition for `name`, without checking module names
    pub fn definition(&self, name: &str) -> Result<(OrchestrationDefinition, DefinitionSource)> {
        if !is_valid_name(name) {
            return Err(EngineError::resolution(
                ErrorCode::ORCHESTRATION_NOT_FOUND,
                name,
                "orchestration names may only contain letters, digits, '-' and '_'",
            ));
        }

        for ext in DEFINITION_EXTENSIONS {
            let path = self.folder.join(format!("{name}.{ext}"));
            if path.is_file() {
                debug!("Using [{}] file to obtain a list of modules", path.display());
                let definition = OrchestrationDefinition::from_file(name, &path)?;
                return Ok((definition, DefinitionSource::File(path)));
            }
        }

        if let Some(definition) = self.builtins.get(name) {
            debug!("Using built-in definition for orchestration [{}]", name);
            return Ok((definition.clone(), DefinitionSource::Builtin));
        }

        Err(EngineError::resolution(
            ErrorCode::ORCHESTRATION_NOT_FOUND,
            name,
            format!(
                "no definition in {} and no built-in pipeline of that name (available: {})",
                self.folder.display(),
                self.available().join(", ")
            ),
        ))
    }

    /// Resolve `name` to descriptors from `registry`
    pub fn resolve(&self, name: &str, registry: &ModuleRegistry) -> Result<Orchestration> {
        let (definition, source) = self.definition(name)?;

        let mut modules = Vec::with_capacity(definition.modules.len());
        for module in &definition.modules {
            let descriptor = registry.get(module).ok_or_else(|| {
                EngineError::resolution(
                    ErrorCode::ORCHESTRATION_UNKNOWN_MODULE,
                    name,
                    format!(
                        "module '{}' is not registered (known modules: {})",
                        module,
                        registry.names().join(", ")
                    ),
                )
            })?;
            modules.push(descriptor.clone());
        }

        Ok(Orchestration {
            name: name.to_string(),
            source,
            modules,
        })
    }
}

/// Names map straight to file names, so path separators are refused
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
