//! Jinja adapter built on minijinja.
//!
//! Includes and imports are resolved relative to the templates directory
//! first, then the components directory, then the directory of the rendered
//! template. All template sources go through the shared [`TemplateCache`].

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

use crate::cache::TemplateCache;
use crate::traits::{
    Adapter, AdapterError, AdapterOptions, RegisterComponentFile, Render, Rendered, Scaffold,
    ScaffoldFile, Setup,
};

/// Environment settings read from the adapter options during setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Settings {
    trim_blocks: bool,
    lstrip_blocks: bool,
    strict: bool,
}

/// Adapter for `.jinja` templates.
#[derive(Debug, Default)]
pub struct JinjaAdapter {
    cache: Arc<TemplateCache>,
    settings: OnceLock<Settings>,
}

impl JinjaAdapter {
    /// Create a new Jinja adapter.
    pub fn new() -> Self {
        Self::default()
    }

    fn environment(&self, options: &AdapterOptions, template_path: &Path) -> Environment<'static> {
        let settings = self.settings.get().copied().unwrap_or_default();

        let mut env = Environment::new();
        env.set_trim_blocks(settings.trim_blocks);
        env.set_lstrip_blocks(settings.lstrip_blocks);
        if settings.strict {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        let mut roots = options.template_roots();
        if let Some(parent) = template_path.parent() {
            roots.push(parent.to_path_buf());
        }

        let cache = Arc::clone(&self.cache);
        env.set_loader(move |name| {
            let Some(relative) = safe_relative(name) else {
                return Ok(None);
            };

            for root in &roots {
                let candidate = root.join(&relative);
                if candidate.is_file() {
                    let source = cache.load(&candidate).map_err(|e| {
                        minijinja::Error::new(
                            minijinja::ErrorKind::InvalidOperation,
                            format!("could not read {}: {}", candidate.display(), e),
                        )
                    })?;
                    return Ok(Some(source.to_string()));
                }
            }

            Ok(None)
        });

        env
    }
}

impl Adapter for JinjaAdapter {
    fn name(&self) -> &'static str {
        "jinja"
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

    fn as_scaffold(&self) -> Option<&dyn Scaffold> {
        Some(self)
    }
}

impl Setup for JinjaAdapter {
    fn setup(&self, options: &AdapterOptions) -> Result<(), AdapterError> {
        let flag = |key: &str| match options.get(key) {
            None => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(other) => Err(AdapterError::Setup(format!(
                "jinja option \"{}\" must be a boolean, got {}",
                key, other
            ))),
        };

        let settings = Settings {
            trim_blocks: flag("trim_blocks")?,
            lstrip_blocks: flag("lstrip_blocks")?,
            strict: flag("strict")?,
        };

        if self.settings.set(settings).is_err() {
            tracing::debug!("Jinja adapter for .{} was already set up", options.ext);
        }

        Ok(())
    }
}

impl Render for JinjaAdapter {
    fn render(
        &self,
        options: &AdapterOptions,
        template_path: &Path,
        data: &Value,
    ) -> Result<Rendered, AdapterError> {
        let source = self
            .cache
            .load(template_path)
            .map_err(|e| AdapterError::render("Jinja", options, template_path, e, data))?;

        let name = template_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("template");

        let env = self.environment(options, template_path);
        let html = env
            .render_named_str(name, &source, data)
            .map_err(|e| AdapterError::render("Jinja", options, template_path, e, data))?;

        Ok(Rendered::Html(html))
    }
}

impl RegisterComponentFile for JinjaAdapter {
    fn register_component_file(
        &self,
        _options: &AdapterOptions,
        file_path: &Path,
    ) -> Result<Option<Value>, AdapterError> {
        self.cache.invalidate(file_path);
        Ok(None)
    }
}

impl Scaffold for JinjaAdapter {
    fn files_for_component(&self, component: &str) -> Vec<ScaffoldFile> {
        vec![ScaffoldFile {
            basename: format!("{}.jinja", component),
            data: format!(
                "{{% macro {}(label) %}}\n<div class=\"{}\">{{{{ label }}}}</div>\n{{% endmacro %}}\n",
                component.replace('-', "_"),
                component
            ),
        }]
    }

    fn files_for_variant(&self, component: &str, variant: &str) -> Vec<ScaffoldFile> {
        vec![ScaffoldFile {
            basename: format!("{}.jinja", variant),
            data: format!(
                "{{% from \"{}/{}.jinja\" import {} %}}\n{{{{ {}(label) }}}}\n",
                component,
                component,
                component.replace('-', "_"),
                component.replace('-', "_")
            ),
        }]
    }
}

/// Turn a template name into a relative path, rejecting absolute paths and
/// parent directory segments.
fn safe_relative(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::fs;
    use tempfile::tempdir;

    fn options_for(root: &Path) -> AdapterOptions {
        AdapterOptions {
            ext: "jinja".to_string(),
            components: Some(root.join("components")),
            templates: Some(root.join("templates")),
            ..Default::default()
        }
    }

    #[test]
    fn renders_template_with_data() {
        let temp = tempdir().unwrap();
        let template = temp.path().join("template.jinja");
        fs::write(&template, "<p>{{ myData }}</p>").unwrap();

        let adapter = JinjaAdapter::new();
        let rendered = adapter
            .render(&options_for(temp.path()), &template, &json!({ "myData": 1 }))
            .unwrap();

        assert_eq!(rendered, Rendered::Html("<p>1</p>".to_string()));
    }

    #[test]
    fn resolves_component_imports() {
        let temp = tempdir().unwrap();
        let button = temp.path().join("components").join("button");
        fs::create_dir_all(button.join("variants")).unwrap();

        let adapter = JinjaAdapter::new();
        let component = &adapter.files_for_component("button")[0];
        fs::write(button.join(&component.basename), &component.data).unwrap();
        let variant = &adapter.files_for_variant("button", "primary")[0];
        let variant_path = button.join("variants").join(&variant.basename);
        fs::write(&variant_path, &variant.data).unwrap();

        let rendered = adapter
            .render(
                &options_for(temp.path()),
                &variant_path,
                &json!({ "label": "Go" }),
            )
            .unwrap();

        let Rendered::Html(html) = rendered else {
            panic!("expected html output");
        };
        assert!(html.contains("<div class=\"button\">Go</div>"));
    }

    #[test]
    fn errors_name_the_template() {
        let adapter = JinjaAdapter::new();
        let error = adapter
            .render(
                &AdapterOptions::default(),
                Path::new("does-not-exist.jinja"),
                &json!({}),
            )
            .unwrap_err();

        assert!(error
            .to_string()
            .contains("Jinja could not render \"does-not-exist.jinja\""));
    }

    #[test]
    fn debug_errors_include_the_context() {
        let temp = tempdir().unwrap();
        let template = temp.path().join("invalid-template.jinja");
        fs::write(&template, "{% if %}").unwrap();

        let options = AdapterOptions {
            debug: true,
            ..Default::default()
        };
        let error = JinjaAdapter::new()
            .render(&options, &template, &json!({ "myData": 1 }))
            .unwrap_err();

        let message = error.to_string();
        assert!(message.contains("invalid-template.jinja"));
        assert!(message.contains("\"myData\": 1"));
    }

    #[test]
    fn setup_rejects_non_boolean_flags() {
        let mut extra = Map::new();
        extra.insert("strict".to_string(), json!("yes"));
        let options = AdapterOptions {
            extra,
            ..Default::default()
        };

        let result = JinjaAdapter::new().setup(&options);

        assert!(matches!(result, Err(AdapterError::Setup(_))));
    }

    #[test]
    fn strict_mode_fails_on_undefined_values() {
        let temp = tempdir().unwrap();
        let template = temp.path().join("strict.jinja");
        fs::write(&template, "{{ nope }}").unwrap();

        let mut extra = Map::new();
        extra.insert("strict".to_string(), json!(true));
        let options = AdapterOptions {
            extra,
            ..Default::default()
        };

        let adapter = JinjaAdapter::new();
        adapter.setup(&options).unwrap();

        assert!(adapter.render(&options, &template, &json!({})).is_err());
    }

    #[test]
    fn rejects_parent_directory_names() {
        assert_eq!(safe_relative("../secret"), None);
        assert_eq!(safe_relative("/etc/passwd"), None);
        assert_eq!(
            safe_relative("button/button.jinja"),
            Some(PathBuf::from("button/button.jinja"))
        );
    }
}
