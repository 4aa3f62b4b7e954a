//! Trait definitions for template adapters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options an adapter is invoked with.
///
/// The configured adapter options are expanded with the project's source and
/// target paths and the file extension the adapter is registered for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterOptions {
    /// Extension this adapter instance is registered for (e.g. "html")
    pub ext: String,

    /// Components source directory
    pub components: Option<PathBuf>,

    /// Templates source directory
    pub templates: Option<PathBuf>,

    /// Output directory
    pub target: PathBuf,

    /// Include rendering context in error messages
    pub debug: bool,

    /// Adapter specific options from the configuration
    pub extra: Map<String, Value>,
}

impl AdapterOptions {
    /// Look up an adapter specific option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Directories templates may be loaded from, most specific first.
    pub fn template_roots(&self) -> Vec<PathBuf> {
        self.templates
            .iter()
            .chain(self.components.iter())
            .cloned()
            .collect()
    }
}

/// One part of a rendered template (e.g. the template source and its HTML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPart {
    /// Language of the content, used for highlighting
    pub lang: String,
    /// Display title
    pub title: String,
    /// The content itself
    pub content: String,
}

/// Structured result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Rendered HTML used for previews
    pub rendered: String,
    /// Parts shown as code listings
    pub parts: Vec<RenderPart>,
}

impl RenderOutput {
    /// Wrap plain HTML into a single-part output.
    pub fn from_html(html: impl Into<String>) -> Self {
        let rendered = html.into();

        Self {
            parts: vec![RenderPart {
                lang: "html".to_string(),
                title: "HTML".to_string(),
                content: rendered.clone(),
            }],
            rendered,
        }
    }
}

/// What an adapter returns from a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Plain HTML
    Html(String),
    /// Multi-part output, passed through as is
    Parts(RenderOutput),
}

impl From<String> for Rendered {
    fn from(html: String) -> Self {
        Self::Html(html)
    }
}

impl From<RenderOutput> for Rendered {
    fn from(output: RenderOutput) -> Self {
        Self::Parts(output)
    }
}

/// A file an adapter suggests when scaffolding components or variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaffoldFile {
    /// File name including extension
    pub basename: String,
    /// File contents
    pub data: String,
}

/// Errors raised by adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{message}")]
    Render { path: PathBuf, message: String },

    #[error("Adapter setup failed: {0}")]
    Setup(String),

    #[error("Failed to register {path}: {message}")]
    Register { path: PathBuf, message: String },
}

impl AdapterError {
    /// Build a user facing render error naming the failing file.
    ///
    /// With `debug` enabled the message also carries the pretty-printed data
    /// the template was rendered with.
    pub fn render(
        adapter: &str,
        options: &AdapterOptions,
        path: &Path,
        cause: impl std::fmt::Display,
        data: &Value,
    ) -> Self {
        let mut message = format!(
            "{} could not render \"{}\"!\n\n{}",
            adapter,
            path.display(),
            cause
        );

        if options.debug {
            let dump = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            message.push_str("\n\n");
            message.push_str(&dump);
        }

        Self::Render {
            path: path.to_path_buf(),
            message,
        }
    }
}

/// One-time initialisation with the expanded options.
pub trait Setup {
    fn setup(&self, options: &AdapterOptions) -> Result<(), AdapterError>;
}

/// Render a template file with the given data.
pub trait Render {
    fn render(
        &self,
        options: &AdapterOptions,
        template_path: &Path,
        data: &Value,
    ) -> Result<Rendered, AdapterError>;
}

/// Get notified about files in a component folder.
///
/// The returned value is merged into the component record.
pub trait RegisterComponentFile {
    fn register_component_file(
        &self,
        options: &AdapterOptions,
        file_path: &Path,
    ) -> Result<Option<Value>, AdapterError>;
}

/// Boilerplate files for new components and variants.
pub trait Scaffold {
    fn files_for_component(&self, component: &str) -> Vec<ScaffoldFile>;

    fn files_for_variant(&self, component: &str, variant: &str) -> Vec<ScaffoldFile>;
}

/// A template engine plugin.
///
/// Every capability is optional; an adapter opts in by returning itself from
/// the matching accessor.
pub trait Adapter: Send + Sync {
    /// Adapter identifier (e.g. "html", "jinja")
    fn name(&self) -> &'static str;

    fn as_setup(&self) -> Option<&dyn Setup> {
        None
    }

    fn as_render(&self) -> Option<&dyn Render> {
        None
    }

    fn as_register(&self) -> Option<&dyn RegisterComponentFile> {
        None
    }

    fn as_scaffold(&self) -> Option<&dyn Scaffold> {
        None
    }
}
