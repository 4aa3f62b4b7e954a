//! Dispatch of template work to the adapter registered for a file extension.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use stylebook_adapters::{
    Adapter, AdapterError, AdapterOptions, AdapterRegistry, RenderOutput, Rendered, ScaffoldFile,
};

use crate::config::Config;

/// An adapter instance together with the options it was set up with.
#[derive(Clone)]
struct Registration {
    module: String,
    adapter: Arc<dyn Adapter>,
    options: Arc<AdapterOptions>,
}

/// Routes render and registration requests to adapters by file extension.
///
/// Built once per build with [`Connector::setup`]; read-only afterwards.
#[derive(Clone, Default)]
pub struct Connector {
    adapters: BTreeMap<String, Registration>,
}

impl Connector {
    /// Resolve and set up every adapter the configuration names.
    ///
    /// Fails on the first adapter whose module is unknown or whose setup
    /// rejects the options. No partially set up connector is returned.
    pub fn setup(config: &Config, registry: &AdapterRegistry) -> Result<Self, ConnectorError> {
        let mut adapters = BTreeMap::new();

        for (ext, adapter_config) in &config.adapters {
            let adapter = registry.resolve(&adapter_config.module).map_err(|_| {
                ConnectorError::AdapterUnresolved {
                    ext: ext.clone(),
                    module: adapter_config.module.clone(),
                }
            })?;

            let options = AdapterOptions {
                ext: ext.clone(),
                components: config.source.components.clone(),
                templates: config.source.templates.clone(),
                target: config.target.clone(),
                debug: config.debug,
                extra: adapter_config.options.clone(),
            };

            if let Some(setup) = adapter.as_setup() {
                setup
                    .setup(&options)
                    .map_err(|source| ConnectorError::AdapterSetup {
                        ext: ext.clone(),
                        source,
                    })?;
            }

            tracing::debug!(
                "Registered {} adapter for .{} files",
                adapter.name(),
                ext
            );

            adapters.insert(
                ext.clone(),
                Registration {
                    module: adapter_config.module.clone(),
                    adapter,
                    options: Arc::new(options),
                },
            );
        }

        Ok(Self { adapters })
    }

    /// Extensions with a registered adapter, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    pub fn has_adapter(&self, ext: &str) -> bool {
        self.adapters.contains_key(ext)
    }

    fn registration_for(&self, path: &Path) -> Option<(&str, &Registration)> {
        let ext = extension(path)?;
        self.adapters
            .get_key_value(ext)
            .map(|(ext, registration)| (ext.as_str(), registration))
    }

    /// Notify the adapter for this file's extension about a component file.
    ///
    /// Files without a matching adapter, or adapters without the capability,
    /// yield `Ok(None)`.
    pub async fn register_component_file(
        &self,
        file_path: &Path,
    ) -> Result<Option<Value>, ConnectorError> {
        let Some((_, registration)) = self.registration_for(file_path) else {
            return Ok(None);
        };
        if registration.adapter.as_register().is_none() {
            return Ok(None);
        }

        let registration = registration.clone();
        let file_path = file_path.to_path_buf();
        let data = tokio::task::spawn_blocking(move || match registration.adapter.as_register() {
            Some(register) => register.register_component_file(&registration.options, &file_path),
            None => Ok(None),
        })
        .await??;

        Ok(data)
    }

    /// Render a template with the adapter for its extension.
    ///
    /// Plain HTML results are wrapped into a single HTML part; structured
    /// results pass through unchanged.
    pub async fn render(
        &self,
        template_path: &Path,
        data: &Value,
    ) -> Result<RenderOutput, ConnectorError> {
        let Some((ext, registration)) = self.registration_for(template_path) else {
            return Err(ConnectorError::AdapterMissing {
                ext: extension(template_path).unwrap_or_default().to_string(),
                path: template_path.to_path_buf(),
            });
        };
        if registration.adapter.as_render().is_none() {
            return Err(ConnectorError::AdapterCapability {
                ext: ext.to_string(),
                module: registration.module.clone(),
                capability: "render",
            });
        }

        tracing::debug!("Rendering {}", template_path.display());

        let registration = registration.clone();
        let template_path = template_path.to_path_buf();
        let data = data.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            match registration.adapter.as_render() {
                Some(render) => render.render(&registration.options, &template_path, &data),
                None => Ok(Rendered::Html(String::new())),
            }
        })
        .await??;

        Ok(match rendered {
            Rendered::Html(html) => RenderOutput::from_html(html),
            Rendered::Parts(output) => output,
        })
    }

    /// Boilerplate files for a new component, empty without the capability.
    pub fn files_for_component(&self, ext: &str, component: &str) -> Vec<ScaffoldFile> {
        self.adapters
            .get(ext)
            .and_then(|registration| registration.adapter.as_scaffold())
            .map(|scaffold| scaffold.files_for_component(component))
            .unwrap_or_default()
    }

    /// Boilerplate files for a new variant, empty without the capability.
    pub fn files_for_variant(&self, ext: &str, component: &str, variant: &str) -> Vec<ScaffoldFile> {
        self.adapters
            .get(ext)
            .and_then(|registration| registration.adapter.as_scaffold())
            .map(|scaffold| scaffold.files_for_variant(component, variant))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.adapters
                    .iter()
                    .map(|(ext, registration)| (ext, &registration.module)),
            )
            .finish()
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Errors raised while setting up or dispatching to adapters.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Adapter module \"{module}\" for .{ext} files could not be resolved")]
    AdapterUnresolved { ext: String, module: String },

    #[error("Setup of the .{ext} adapter failed: {source}")]
    AdapterSetup {
        ext: String,
        #[source]
        source: AdapterError,
    },

    #[error("No adapter registered for .{ext} files, cannot handle {path}")]
    AdapterMissing { ext: String, path: PathBuf },

    #[error("Adapter \"{module}\" for .{ext} files does not implement {capability}")]
    AdapterCapability {
        ext: String,
        module: String,
        capability: &'static str,
    },

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Adapter task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
