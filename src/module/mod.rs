//! Module contract and lifecycle wrapper
//!
//! A module is one self-contained unit of pipeline work. The orchestrator
//! builds modules through [`ModuleDescriptor`]s and runs each one through
//! [`execute`], which only adds start/end logging around [`Module::run`].

use crate::run::RunContext;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub mod registry;

pub use registry::ModuleRegistry;

/// Core trait every pipeline module implements
pub trait Module {
    /// Identifier used in logs and orchestration definitions
    fn name(&self) -> &str;

    /// Perform the module's work; any error aborts the pipeline
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Lifecycle state of one module within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Run a module with start and end events
///
/// Errors from `run` are returned exactly as produced; the end event is only
/// logged on success.
pub fn execute(module: &mut dyn Module) -> anyhow::Result<()> {
    info!(module = module.name(), "Start of module {}...", module.name());

    module.run()?;

    info!(module = module.name(), "End of module {}...", module.name());
    Ok(())
}

/// Constructor for a module, given the shared run context
pub type ModuleFactory = dyn Fn(&RunContext) -> anyhow::Result<Box<dyn Module>>;

/// Named reference to a module implementation
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    factory: Arc<ModuleFactory>,
}

impl ModuleDescriptor {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&RunContext) -> anyhow::Result<Box<dyn Module>> + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh module instance bound to `context`
    pub fn instantiate(&self, context: &RunContext) -> anyhow::Result<Box<dyn Module>> {
        (self.factory)(context)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
