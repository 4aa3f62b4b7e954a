//! Project configuration.
//!
//! The configuration is read once per build and never mutated afterwards.
//! Relative source and target paths are resolved against the directory of
//! the configuration file with [`Config::resolve_paths`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project name shown in the UI
    #[serde(default = "default_name")]
    pub name: String,

    /// Project version shown in the UI
    #[serde(default = "default_version")]
    pub version: String,

    /// Source directories
    #[serde(default)]
    pub source: SourceConfig,

    /// Output directory
    #[serde(default = "default_target")]
    pub target: PathBuf,

    /// Adapters by file extension
    #[serde(default)]
    pub adapters: BTreeMap<String, AdapterConfig>,

    /// Default template for variant previews and pages, relative to the
    /// templates directory
    #[serde(default = "default_template")]
    pub template: String,

    /// Write the state dump and include render contexts in errors
    #[serde(default)]
    pub debug: bool,

    /// Options passed through to the UI theme
    #[serde(default)]
    pub ui: Map<String, Value>,

    /// Build timestamp in milliseconds, set when the configuration is loaded
    #[serde(default, skip_deserializing)]
    pub update: u64,
}

/// Source directories of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Project root (directory of the configuration file)
    #[serde(default, skip_deserializing)]
    pub base: PathBuf,

    /// Configuration file the project was loaded from
    #[serde(default, skip_deserializing)]
    pub config_file: Option<PathBuf>,

    pub components: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub pages: Option<PathBuf>,
    pub entities: Option<PathBuf>,
    pub data: Option<PathBuf>,
}

/// Adapter registration from the configuration.
///
/// Accepts either a bare module name or a table with `module` and `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AdapterEntry")]
pub struct AdapterConfig {
    pub module: String,
    pub options: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AdapterEntry {
    Module(String),
    Full {
        module: String,
        #[serde(default)]
        options: Map<String, Value>,
    },
}

impl From<AdapterEntry> for AdapterConfig {
    fn from(entry: AdapterEntry) -> Self {
        match entry {
            AdapterEntry::Module(module) => Self {
                module,
                options: Map::new(),
            },
            AdapterEntry::Full { module, options } => Self { module, options },
        }
    }
}

impl AdapterConfig {
    /// Create a registration without options.
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            options: Map::new(),
        }
    }
}

fn default_name() -> String {
    "Stylebook".to_string()
}
fn default_version() -> String {
    "0.0.0".to_string()
}
fn default_target() -> PathBuf {
    PathBuf::from("dist")
}
fn default_template() -> String {
    "stylebook.html".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            source: SourceConfig::default(),
            target: default_target(),
            adapters: BTreeMap::new(),
            template: default_template(),
            debug: false,
            ui: Map::new(),
            update: 0,
        }
    }
}

impl Config {
    /// Resolve relative source and target paths against `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        self.source.base = base.to_path_buf();
        resolve(&mut self.target);
        for dir in [
            &mut self.source.components,
            &mut self.source.templates,
            &mut self.source.pages,
            &mut self.source.entities,
            &mut self.source.data,
        ]
        .into_iter()
        .flatten()
        {
            resolve(dir);
        }

        self
    }

    /// Absolute path of a template file name.
    pub fn template_path(&self, template: &str) -> PathBuf {
        match &self.source.templates {
            Some(templates) => templates.join(template),
            None => self.source.base.join(template),
        }
    }
}
