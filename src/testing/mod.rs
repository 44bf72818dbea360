//! Testing utilities and fixtures
//!
//! Spy modules that record construction and execution order, plus settings
//! rooted in a temporary directory.

use crate::config::{
    DataSettings, ModelDataSettings, ModelSettings, OrchestrationSettings, PreprocessSettings,
    RunsSettings, Settings,
};
use crate::module::{Module, ModuleRegistry};
use crate::run::{RunContext, RunMetadata};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Settings with every path rooted under `root`
pub fn settings_in(root: &Path) -> Settings {
    Settings {
        orchestration: OrchestrationSettings {
            folder_path: root.join("orchestrate"),
        },
        model: ModelSettings {
            data: ModelDataSettings {
                training_end_date: "2021-01-01".to_string(),
                shift: -1,
                target: "AL_PRICE".to_string(),
            },
            linear: Default::default(),
        },
        runs: RunsSettings {
            root: root.join("runs"),
        },
        data: DataSettings {
            root: root.join("data"),
        },
        preprocess: PreprocessSettings::default(),
    }
}

/// A run context whose folders exist but with no logging attached
pub fn context_with(settings: Settings) -> RunContext {
    let run = RunMetadata::create(&settings.runs.root);
    std::fs::create_dir_all(run.logs_dir()).expect("create logs dir");
    std::fs::create_dir_all(&run.plots_dir).expect("create plots dir");
    RunContext::new(Arc::new(settings), run)
}

/// Something a spy observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpyEvent {
    Constructed(String),
    Ran { module: String, run_folder: PathBuf },
}

/// Shared, ordered record of spy events
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    events: Rc<RefCell<Vec<SpyEvent>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SpyEvent> {
        self.events.borrow().clone()
    }

    /// Names of constructed modules, in order
    pub fn constructed(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SpyEvent::Constructed(name) => Some(name.clone()),
                SpyEvent::Ran { .. } => None,
            })
            .collect()
    }

    /// Names of modules whose `run` was called, in order
    pub fn ran(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SpyEvent::Ran { module, .. } => Some(module.clone()),
                SpyEvent::Constructed(_) => None,
            })
            .collect()
    }

    /// Run folders observed by each `run` call, in order
    pub fn observed_run_folders(&self) -> Vec<PathBuf> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SpyEvent::Ran { run_folder, .. } => Some(run_folder.clone()),
                SpyEvent::Constructed(_) => None,
            })
            .collect()
    }

    fn push(&self, event: SpyEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Module that records what happens to it and optionally fails
pub struct SpyModule {
    name: String,
    context: RunContext,
    log: CallLog,
    fail: bool,
}

impl Module for SpyModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.log.push(SpyEvent::Ran {
            module: self.name.clone(),
            run_folder: self.context.run().run_folder.clone(),
        });
        if self.fail {
            anyhow::bail!("{} failed on purpose", self.name);
        }
        Ok(())
    }
}

/// Registry where every name in `names` is a spy; `failing` names fail in `run`
pub fn spy_registry(names: &[&str], failing: &[&str], log: &CallLog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for name in names {
        let name = name.to_string();
        let fail = failing.contains(&name.as_str());
        let log = log.clone();
        let key = name.clone();
        registry.register_fn(&key, move |ctx| {
            log.push(SpyEvent::Constructed(name.clone()));
            Ok(Box::new(SpyModule {
                name: name.clone(),
                context: ctx.clone(),
                log: log.clone(),
                fail,
            }))
        });
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::execute;
    use tempfile::TempDir;

    #[test]
    fn test_spy_records_construction_and_run() {
        let dir = TempDir::new().unwrap();
        let context = context_with(settings_in(dir.path()));
        let log = CallLog::new();
        let registry = spy_registry(&["A", "B"], &["B"], &log);

        let mut a = registry.get("A").unwrap().instantiate(&context).unwrap();
        execute(a.as_mut()).unwrap();
        let mut b = registry.get("B").unwrap().instantiate(&context).unwrap();
        assert!(execute(b.as_mut()).is_err());

        assert_eq!(log.constructed(), vec!["A", "B"]);
        assert_eq!(log.ran(), vec!["A", "B"]);
        assert_eq!(
            log.observed_run_folders(),
            vec![context.run().run_folder.clone(); 2]
        );
    }
}
