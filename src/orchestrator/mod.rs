//! Sequential, fail-fast pipeline execution
//!
//! Modules run strictly in declaration order, one at a time. A module is
//! only constructed once every module before it has completed; the first
//! failure stops the run and is returned to the caller. Files written by
//! modules that already completed are left in place.

use crate::error::{EngineError, Result};
use crate::module::{execute, ModuleState};
use crate::run::RunContext;
use chrono::{DateTime, Local};
use tracing::{debug, error, info};

pub mod resolver;

pub use resolver::{DefinitionSource, Orchestration, OrchestrationResolver};

/// Outcome of a fully successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub orchestration: String,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub modules: Vec<(String, ModuleState)>,
}

impl RunReport {
    pub fn completed_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|(_, state)| *state == ModuleState::Completed)
            .count()
    }
}

/// Executes a resolved orchestration against a run context
pub struct Orchestrator<'a> {
    context: &'a RunContext,
}

impl<'a> Orchestrator<'a> {
    pub fn new(context: &'a RunContext) -> Self {
        Self { context }
    }

    /// Run every module of `orchestration` in order, stopping at the first failure
    pub fn execute(&self, orchestration: &Orchestration) -> Result<RunReport> {
        let run = self.context.run();
        debug!(
            "The list of modules that will be executed are {:?}",
            orchestration.module_names()
        );
        info!(
            "Starting all modules execution for [{}] from {}...",
            orchestration.name, orchestration.source
        );

        let mut states: Vec<(String, ModuleState)> = orchestration
            .modules
            .iter()
            .map(|d| (d.name().to_string(), ModuleState::NotStarted))
            .collect();

        for (index, descriptor) in orchestration.modules.iter().enumerate() {
            info!(
                "Queueing modules execution for module [{}] ({}/{})...",
                descriptor.name(),
                index + 1,
                orchestration.modules.len()
            );
            states[index].1 = ModuleState::Running;

            let mut module = match descriptor.instantiate(self.context) {
                Ok(module) => module,
                Err(e) => {
                    states[index].1 = ModuleState::Failed;
                    error!(
                        module = descriptor.name(),
                        "Module [{}] could not be constructed: {:#}",
                        descriptor.name(),
                        e
                    );
                    error!("Module states: {}", describe_states(&states));
                    return Err(EngineError::module_construction(descriptor.name(), e));
                }
            };

            if let Err(e) = execute(module.as_mut()) {
                states[index].1 = ModuleState::Failed;
                error!(
                    module = descriptor.name(),
                    "Module [{}] failed, stopping run {}: {:#}",
                    descriptor.name(),
                    run.run_id,
                    e
                );
                error!("Module states: {}", describe_states(&states));
                return Err(EngineError::module(descriptor.name(), e));
            }
            states[index].1 = ModuleState::Completed;
        }

        let finished = Local::now();
        info!("All modules' execution completed and are successful!");
        debug!(
            "\n###########################\nrun id: {}\nrun start time: {}\nrun finish time: {}\n###########################",
            run.run_id,
            run.start_time_display(),
            finished.format(crate::run::metadata::TIMESTAMP_FORMAT)
        );

        Ok(RunReport {
            orchestration: orchestration.name.clone(),
            started: run.start_time,
            finished,
            modules: states,
        })
    }
}

/// `A: completed, B: failed, C: not started`
fn describe_states(states: &[(String, ModuleState)]) -> String {
    states
        .iter()
        .map(|(name, state)| format!("{name}: {state}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bootstrap;
    use crate::orchestrator::OrchestrationResolver;
    use crate::testing::{settings_in, spy_registry, CallLog};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_describe_states() {
        let states = vec![
            ("A".to_string(), ModuleState::Completed),
            ("B".to_string(), ModuleState::Failed),
            ("C".to_string(), ModuleState::NotStarted),
        ];
        assert_eq!(
            describe_states(&states),
            "A: completed, B: failed, C: not started"
        );
    }

    #[test]
    fn test_failed_state_is_logged_to_run_log() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());
        let log = CallLog::new();
        let registry = spy_registry(
            &["CleanEngineer", "Scaling", "Differencing", "PrepareTraining"],
            &["Scaling"],
            &log,
        );
        let resolver = OrchestrationResolver::with_defaults(&settings.orchestration.folder_path);
        let orchestration = resolver.resolve("preprocess", &registry).unwrap();

        let prepared = bootstrap(Arc::new(settings), 0).unwrap();
        let err = Orchestrator::new(&prepared.context)
            .execute(&orchestration)
            .unwrap_err();
        let log_file = prepared.context.run().log_file.clone();
        drop(prepared);

        assert_eq!(err.module_name(), Some("Scaling"));
        let content = std::fs::read_to_string(log_file).unwrap();
        assert!(content.contains(
            "Module states: CleanEngineer: completed, Scaling: failed, Differencing: not started, PrepareTraining: not started"
        ));
    }
}
