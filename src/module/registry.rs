//! Module registry mapping names to constructors
//!
//! Replaces runtime code loading: every module an orchestration can name is
//! registered here up front.

use super::{Module, ModuleDescriptor};
use crate::model::LinearModel;
use crate::processing::{CleanEngineer, Differencing, PrepareTraining, Scaling};
use crate::run::RunContext;
use std::collections::BTreeMap;

/// Registry of every module an orchestration may reference
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    descriptors: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in modules
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_fn(CleanEngineer::NAME, |ctx| {
            Ok(Box::new(CleanEngineer::new(ctx)?))
        });
        registry.register_fn(Scaling::NAME, |ctx| Ok(Box::new(Scaling::new(ctx))));
        registry.register_fn(Differencing::NAME, |ctx| Ok(Box::new(Differencing::new(ctx))));
        registry.register_fn(PrepareTraining::NAME, |ctx| {
            Ok(Box::new(PrepareTraining::new(ctx)?))
        });
        registry.register_fn(LinearModel::NAME, |ctx| Ok(Box::new(LinearModel::new(ctx))));
        registry
    }

    /// Registers a descriptor, replacing any previous one with the same name
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> &mut Self {
        self.descriptors
            .insert(descriptor.name().to_string(), descriptor);
        self
    }

    /// Registers a constructor under `name`
    pub fn register_fn<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&RunContext) -> anyhow::Result<Box<dyn Module>> + 'static,
    {
        self.register(ModuleDescriptor::new(name, factory))
    }

    /// Gets a descriptor by name
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Lists all registered module names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Module for Noop {
        fn name(&self) -> &str {
            "Noop"
        }

        fn run(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_cover_builtin_pipelines() {
        let registry = ModuleRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                "CleanEngineer",
                "Differencing",
                "LinearModel",
                "PrepareTraining",
                "Scaling"
            ]
        );
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ModuleRegistry::with_defaults();
        registry.register_fn("Scaling", |_| Ok(Box::new(Noop)));

        assert_eq!(registry.names().len(), 5);
        assert!(registry.contains("Scaling"));
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let registry = ModuleRegistry::new();
        assert!(registry.get("NeuralNetworkModel").is_none());
    }
}
