//! Plain HTML adapter.
//!
//! Templates are HTML files with `{{ key }}` placeholders that are filled from
//! the render data. Dotted keys (`{{ person.name }}`) walk nested objects.
//! Missing keys render as an empty string.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde_json::Value;

use crate::cache::TemplateCache;
use crate::traits::{
    Adapter, AdapterError, AdapterOptions, RegisterComponentFile, Render, Rendered, Scaffold,
    ScaffoldFile,
};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_$.-]+)\s*\}\}").unwrap());

/// Adapter for `.html` templates.
#[derive(Debug, Default)]
pub struct HtmlAdapter {
    cache: Arc<TemplateCache>,
}

impl HtmlAdapter {
    /// Create a new HTML adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter sharing an existing template cache.
    pub fn with_cache(cache: Arc<TemplateCache>) -> Self {
        Self { cache }
    }
}

impl Adapter for HtmlAdapter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn as_render(&self) -> Option<&dyn Render> {
        Some(self)
    }

    fn as_register(&self) -> Option<&dyn RegisterComponentFile> {
        Some(self)
    }

    fn as_scaffold(&self) -> Option<&dyn Scaffold> {
        Some(self)
    }
}

impl Render for HtmlAdapter {
    fn render(
        &self,
        options: &AdapterOptions,
        template_path: &Path,
        data: &Value,
    ) -> Result<Rendered, AdapterError> {
        let source = self
            .cache
            .load(template_path)
            .map_err(|e| AdapterError::render("HTML", options, template_path, e, data))?;

        Ok(Rendered::Html(interpolate(&source, data)))
    }
}

impl RegisterComponentFile for HtmlAdapter {
    fn register_component_file(
        &self,
        _options: &AdapterOptions,
        file_path: &Path,
    ) -> Result<Option<Value>, AdapterError> {
        self.cache.invalidate(file_path);
        Ok(None)
    }
}

impl Scaffold for HtmlAdapter {
    fn files_for_component(&self, component: &str) -> Vec<ScaffoldFile> {
        vec![ScaffoldFile {
            basename: format!("{}.html", component),
            data: format!("<div class=\"{}\">\n  {{{{ content }}}}\n</div>\n", component),
        }]
    }

    fn files_for_variant(&self, component: &str, variant: &str) -> Vec<ScaffoldFile> {
        vec![ScaffoldFile {
            basename: format!("{}.html", variant),
            data: format!(
                "<div class=\"{} {}--{}\">{{{{ label }}}}</div>\n",
                component, component, variant
            ),
        }]
    }
}

/// Replace `{{ key }}` placeholders with values from `data`.
fn interpolate(source: &str, data: &Value) -> String {
    PLACEHOLDER
        .replace_all(source, |caps: &Captures| {
            let value = caps[1]
                .split('.')
                .try_fold(data, |value, key| value.get(key));

            match value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        })
        .into_owned()
}
