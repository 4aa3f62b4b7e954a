//! Adapter registry for resolving configured adapter modules.
//!
//! The configuration names adapters by module (e.g. `stylebook-adapter-jinja`).
//! The registry maps those names to factories producing adapter instances, so
//! each configured extension gets its own instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::html::HtmlAdapter;
use crate::jinja::JinjaAdapter;
use crate::traits::Adapter;

type Factory = Arc<dyn Fn() -> Arc<dyn Adapter> + Send + Sync>;

/// A registry of adapter factories keyed by module name.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, Factory>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry knowing the built-in adapters.
    ///
    /// Both the full module names and their short aliases are registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for module in ["stylebook-adapter-html", "html"] {
            registry.register(module, || Arc::new(HtmlAdapter::new()));
        }
        for module in ["stylebook-adapter-jinja", "jinja"] {
            registry.register(module, || Arc::new(JinjaAdapter::new()));
        }

        registry
    }

    /// Register a factory under a module name, replacing any previous one.
    pub fn register<F>(&mut self, module: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Adapter> + Send + Sync + 'static,
    {
        self.factories.insert(module.into(), Arc::new(factory));
    }

    /// Create an adapter instance for a module name.
    pub fn resolve(&self, module: &str) -> Result<Arc<dyn Adapter>, RegistryError> {
        self.factories
            .get(module)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::UnknownModule(module.to_string()))
    }

    /// Check if a module is registered.
    pub fn contains(&self, module: &str) -> bool {
        self.factories.contains_key(module)
    }

    /// Get all registered module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("modules", &self.modules())
            .finish()
    }
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Adapter module not found: {0}")]
    UnknownModule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopAdapter;

    impl Adapter for NoopAdapter {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    #[test]
    fn resolves_builtin_adapters() {
        let registry = AdapterRegistry::with_builtins();

        assert_eq!(registry.resolve("html").unwrap().name(), "html");
        assert_eq!(
            registry.resolve("stylebook-adapter-jinja").unwrap().name(),
            "jinja"
        );
    }

    #[test]
    fn registers_custom_adapters() {
        let mut registry = AdapterRegistry::new();
        registry.register("noop-adapter", || Arc::new(NoopAdapter));

        let adapter = registry.resolve("noop-adapter").unwrap();

        assert_eq!(adapter.name(), "noop");
        assert!(adapter.as_render().is_none());
        assert_eq!(registry.modules(), vec!["noop-adapter"]);
    }

    #[test]
    fn errors_on_unknown_module() {
        let registry = AdapterRegistry::with_builtins();

        let result = registry.resolve("doesnotexist");

        assert!(matches!(result, Err(RegistryError::UnknownModule(m)) if m == "doesnotexist"));
        assert!(!registry.contains("doesnotexist"));
    }

    #[test]
    fn creates_a_fresh_instance_per_resolve() {
        let registry = AdapterRegistry::with_builtins();

        let first = registry.resolve("jinja").unwrap();
        let second = registry.resolve("jinja").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }
}
