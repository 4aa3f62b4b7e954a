//! Adapters and fixtures shared by the tests of this crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use stylebook_adapters::{
    Adapter, AdapterError, AdapterOptions, AdapterRegistry, RegisterComponentFile, Render,
    RenderOutput, RenderPart, Rendered, Setup,
};

use crate::config::{AdapterConfig, Config};
use crate::connector::Connector;
use crate::resolver::Resolver;

/// Renders `<p>{data}</p>` and contributes fixed data for component files.
#[derive(Debug, Default)]
pub(crate) struct TestAdapter {
    pub file_data: Option<Value>,
    pub fail_render: bool,
    pub fail_setup: bool,
    pub parts: bool,
    pub setups: AtomicUsize,
}

impl TestAdapter {
    pub fn setup_calls(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }
}

impl Adapter for TestAdapter {
    fn name(&self) -> &'static str {
        "test"
    }

    fn as_setup(&self) -> Option<&dyn Setup> {
        Some(self)
    }

    fn as_render(&self) -> Option<&dyn Render> {
        Some(self)
    }

    fn as_register(&self) -> Option<&dyn RegisterComponentFile> {
        Some(self)
    }
}

impl Setup for TestAdapter {
    fn setup(&self, _options: &AdapterOptions) -> Result<(), AdapterError> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        if self.fail_setup {
            return Err(AdapterError::Setup("rejected".to_string()));
        }
        Ok(())
    }
}

impl Render for TestAdapter {
    fn render(
        &self,
        options: &AdapterOptions,
        template_path: &Path,
        data: &Value,
    ) -> Result<Rendered, AdapterError> {
        if self.fail_render {
            return Err(AdapterError::render(
                "Test",
                options,
                template_path,
                "boom",
                data,
            ));
        }

        let html = format!("<p>{}</p>", data);
        if self.parts {
            return Ok(Rendered::Parts(RenderOutput {
                rendered: html.clone(),
                parts: vec![
                    RenderPart {
                        lang: "test".to_string(),
                        title: "Test".to_string(),
                        content: data.to_string(),
                    },
                    RenderPart {
                        lang: "html".to_string(),
                        title: "HTML".to_string(),
                        content: html,
                    },
                ],
            }));
        }

        Ok(Rendered::Html(html))
    }
}

impl RegisterComponentFile for TestAdapter {
    fn register_component_file(
        &self,
        _options: &AdapterOptions,
        _file_path: &Path,
    ) -> Result<Option<Value>, AdapterError> {
        Ok(self.file_data.clone())
    }
}

/// An adapter without any capability.
#[derive(Debug)]
pub(crate) struct BareAdapter;

impl Adapter for BareAdapter {
    fn name(&self) -> &'static str {
        "bare"
    }
}

/// A registry resolving `module` to one shared adapter instance.
pub(crate) fn registry_with<A: Adapter + 'static>(module: &str, adapter: A) -> AdapterRegistry {
    let adapter: Arc<dyn Adapter> = Arc::new(adapter);
    let mut registry = AdapterRegistry::with_builtins();
    registry.register(module, move || Arc::clone(&adapter));
    registry
}

/// Write a file, creating its parent directories.
pub(crate) fn write(path: impl AsRef<Path>, contents: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Configuration for a project rooted at `root` with `.test` templates.
pub(crate) fn project_config(root: &Path) -> Config {
    let mut config = Config {
        target: PathBuf::from("dist"),
        ..Default::default()
    };
    config.source.components = Some(PathBuf::from("components"));
    config.source.templates = Some(PathBuf::from("templates"));
    config.source.pages = Some(PathBuf::from("pages"));
    config.source.entities = Some(PathBuf::from("entities"));
    config
        .adapters
        .insert("test".to_string(), AdapterConfig::module("test"));
    config.resolve_paths(root)
}

/// A resolver for `config` using `adapter` for `.test` files.
pub(crate) fn resolver_with(config: Config, adapter: TestAdapter) -> Resolver {
    let registry = registry_with("test", adapter);
    let connector = Connector::setup(&config, &registry).unwrap();
    Resolver::new(config, connector)
}

/// A resolver with the default test adapter.
pub(crate) fn resolver(config: Config) -> Resolver {
    resolver_with(config, TestAdapter::default())
}
