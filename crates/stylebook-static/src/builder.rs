//! Static site builder.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use stylebook_core::{util, Connector, ConnectorError, PageType, State, Variant};

use crate::assets::AssetPipeline;
use crate::templates::{ThemeEngine, ThemeError};

/// Replaced with the title of the page or variant.
pub const TITLE_PLACEHOLDER: &str = "<!-- stylebook:title -->";
/// Replaced with the CSS class of the preview.
pub const CLASS_PLACEHOLDER: &str = "<!-- stylebook:class -->";
/// Replaced with the rendered content of the page or variant.
pub const CONTENT_PLACEHOLDER: &str = "<!-- stylebook:content -->";

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of page files generated (templated and token pages)
    pub pages: usize,

    /// Number of variant previews generated
    pub variants: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: ConnectorError,
    },

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Refusing to clear {target}: it contains the source directory {source_dir}")]
    UnsafeTarget { target: PathBuf, source_dir: PathBuf },
}

/// Generates the output tree from a resolved state.
///
/// The builder never mutates the state. Every output path has exactly one
/// writer, so generating the same state twice produces the same files.
pub struct SiteBuilder {
    connector: Arc<Connector>,
    theme: ThemeEngine,
    minify: bool,
}

impl SiteBuilder {
    /// Create a builder rendering project templates through `connector`.
    pub fn new(connector: Arc<Connector>) -> Result<Self, BuildError> {
        Ok(Self {
            connector,
            theme: ThemeEngine::new()?,
            minify: true,
        })
    }

    /// Minify the theme stylesheet (default: on).
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Full build: recreate the target, write the theme assets and run the
    /// increment.
    pub async fn generate(&self, state: &State) -> Result<BuildResult, BuildError> {
        let target = &state.config.target;

        if tokio::fs::try_exists(target).await.unwrap_or(false) {
            check_target(state).await?;
            tokio::fs::remove_dir_all(target)
                .await
                .map_err(|source| write_error(target, source))?;
        }
        tokio::fs::create_dir_all(target)
            .await
            .map_err(|source| write_error(target, source))?;

        AssetPipeline::write_to(target, self.minify)
            .await
            .map_err(|source| write_error(target, source))?;

        self.generate_increment(state).await
    }

    /// Regenerate everything reachable from the state.
    pub async fn generate_increment(&self, state: &State) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let mut pages = 0;
        let mut variants = 0;

        for page_id in state.pages.keys() {
            self.generate_page_files(state, page_id).await?;
        }

        let templates: BTreeSet<&str> = state
            .pages
            .values()
            .filter(|page| page.kind == PageType::Page)
            .filter_map(|page| page.template.as_deref())
            .collect();
        for template in templates {
            pages += self.generate_pages_with_template(state, template).await?.len();
        }

        for page in state.pages.values() {
            if page.kind == PageType::Tokens {
                self.generate_page_with_tokens(state, &page.id).await?;
                pages += 1;
            }
        }

        for component_id in state.components.keys() {
            variants += self.generate_component_variants(state, component_id).await?;
        }

        self.generate_index(state).await?;
        self.generate_sketch(state).await?;
        if state.config.debug {
            self.generate_state(state).await?;
        }

        let duration = start.elapsed();
        tracing::info!(
            "Generated {} pages and {} variants in {}ms",
            pages,
            variants,
            duration.as_millis()
        );

        Ok(BuildResult {
            pages,
            variants,
            duration_ms: duration.as_millis() as u64,
            output_dir: state.config.target.clone(),
        })
    }

    /// Copy the files attached to a page below its public path.
    pub async fn generate_page_files(&self, state: &State, page_id: &str) -> Result<(), BuildError> {
        let page = state
            .pages
            .get(page_id)
            .ok_or_else(|| BuildError::UnknownPage(page_id.to_string()))?;
        let source_dir = state
            .config
            .source
            .pages
            .as_deref()
            .map(|root| util::page_id_to_source_dir(root, &page.id));
        let destination_dir = state.config.target.join(&page.path);

        for file in &page.files {
            let relative = source_dir
                .as_deref()
                .and_then(|dir| file.strip_prefix(dir).ok())
                .map(Path::to_path_buf)
                .or_else(|| file.file_name().map(PathBuf::from))
                .unwrap_or_else(|| file.clone());
            let destination = destination_dir.join(relative);

            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| write_error(parent, source))?;
            }
            tokio::fs::copy(file, &destination)
                .await
                .map_err(|source| BuildError::Copy {
                    from: file.clone(),
                    to: destination.clone(),
                    source,
                })?;
        }

        if !page.files.is_empty() {
            tracing::debug!("Copied {} files of page {}", page.files.len(), page.id);
        }

        Ok(())
    }

    /// Render a page with its template, or the default template.
    pub async fn generate_page_with_template(
        &self,
        state: &State,
        page_id: &str,
    ) -> Result<(), BuildError> {
        let page = state
            .pages
            .get(page_id)
            .ok_or_else(|| BuildError::UnknownPage(page_id.to_string()))?;
        let template = page.template.as_deref().unwrap_or(&state.config.template);

        let html = self
            .render_preview(
                state,
                template,
                &page.context,
                &page.title,
                "stylebook stylebook--page",
                page.content.as_deref().unwrap_or_default(),
            )
            .await?;

        let path = state
            .config
            .target
            .join("_pages")
            .join(format!("{}.html", page.id));
        write_file(&path, html).await?;

        tracing::debug!("Generated page {}", page.id);

        Ok(())
    }

    /// Generate every page declaring `template`. Returns the generated ids.
    pub async fn generate_pages_with_template(
        &self,
        state: &State,
        template: &str,
    ) -> Result<Vec<String>, BuildError> {
        let ids: Vec<String> = state
            .pages
            .values()
            .filter(|page| page.template.as_deref() == Some(template))
            .map(|page| page.id.clone())
            .collect();

        for id in &ids {
            self.generate_page_with_template(state, id).await?;
        }

        Ok(ids)
    }

    /// Render the token listing of a page.
    pub async fn generate_page_with_tokens(
        &self,
        state: &State,
        page_id: &str,
    ) -> Result<(), BuildError> {
        let page = state
            .pages
            .get(page_id)
            .ok_or_else(|| BuildError::UnknownPage(page_id.to_string()))?;

        let html = self.theme.render_tokens(&state.config, page)?;
        let path = state
            .config
            .target
            .join("_tokens")
            .join(format!("{}.html", page.id));
        write_file(&path, html).await
    }

    /// Write the preview page of a variant.
    pub async fn generate_variant(&self, state: &State, variant: &Variant) -> Result<(), BuildError> {
        let template = variant_template(state, variant);

        let html = self
            .render_preview(
                state,
                template,
                &variant.context,
                &variant.title,
                "stylebook stylebook--variant",
                &variant.rendered,
            )
            .await?;

        let path = state
            .config
            .target
            .join("_variants")
            .join(&variant.component_id)
            .join(format!("{}.html", variant.file));
        write_file(&path, html).await?;

        tracing::debug!("Generated variant {}", variant.id);

        Ok(())
    }

    /// Generate every variant previewed with `template`. Returns the
    /// generated ids.
    pub async fn generate_variants_with_template(
        &self,
        state: &State,
        template: &str,
    ) -> Result<Vec<String>, BuildError> {
        let mut ids = Vec::new();
        for variant in state.variants() {
            if variant_template(state, variant) == template {
                self.generate_variant(state, variant).await?;
                ids.push(variant.id.clone());
            }
        }

        Ok(ids)
    }

    /// Generate all variants of a component. Returns how many were written.
    pub async fn generate_component_variants(
        &self,
        state: &State,
        component_id: &str,
    ) -> Result<usize, BuildError> {
        let component = state
            .components
            .get(component_id)
            .ok_or_else(|| BuildError::UnknownComponent(component_id.to_string()))?;

        for variant in &component.variants {
            self.generate_variant(state, variant).await?;
        }

        Ok(component.variants.len())
    }

    /// Write `index.html` with the state embedded as JSON.
    pub async fn generate_index(&self, state: &State) -> Result<(), BuildError> {
        // Keep the embedded JSON from closing its script element.
        let state_json = serde_json::to_string(state)?.replace("</", "<\\/");
        let html = self.theme.render_index(state, &state_json)?;

        write_file(&state.config.target.join("index.html"), html).await
    }

    /// Write `_sketch.html` listing all components and variants.
    pub async fn generate_sketch(&self, state: &State) -> Result<(), BuildError> {
        let html = self.theme.render_sketch(state)?;

        write_file(&state.config.target.join("_sketch.html"), html).await
    }

    /// Write the full state to `_state.json`.
    pub async fn generate_state(&self, state: &State) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(state)?;

        write_file(&state.config.target.join("_state.json"), json).await
    }

    /// Render a project template through the connector and fill in the
    /// stylebook placeholders.
    async fn render_preview(
        &self,
        state: &State,
        template: &str,
        context: &Value,
        title: &str,
        class: &str,
        content: &str,
    ) -> Result<String, BuildError> {
        let template_path = state.config.template_path(template);
        let data = match context {
            Value::Null => Value::Object(Map::new()),
            context => context.clone(),
        };

        let output = self
            .connector
            .render(&template_path, &data)
            .await
            .map_err(|source| BuildError::Render {
                path: template_path.clone(),
                source,
            })?;

        Ok(fill_placeholders(&output.rendered, title, class, content))
    }
}

fn variant_template<'a>(state: &'a State, variant: &'a Variant) -> &'a str {
    variant.template.as_deref().unwrap_or(&state.config.template)
}

/// Replace the stylebook placeholders in a rendered template.
///
/// The content goes in last so placeholders inside it are left alone.
pub fn fill_placeholders(html: &str, title: &str, class: &str, content: &str) -> String {
    html.replace(TITLE_PLACEHOLDER, title)
        .replace(CLASS_PLACEHOLDER, class)
        .replace(CONTENT_PLACEHOLDER, content)
}

async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| write_error(parent, source))?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| write_error(path, source))
}

/// Fails when clearing the target would remove the project or its sources.
async fn check_target(state: &State) -> Result<(), BuildError> {
    let config = &state.config;
    let target = canonical(&config.target).await;
    let sources = [
        &config.source.components,
        &config.source.templates,
        &config.source.pages,
        &config.source.entities,
        &config.source.data,
    ];

    for dir in std::iter::once(&config.source.base).chain(sources.into_iter().flatten()) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        if canonical(dir).await.starts_with(&target) {
            return Err(BuildError::UnsafeTarget {
                target: config.target.clone(),
                source_dir: dir.clone(),
            });
        }
    }

    Ok(())
}

async fn canonical(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

fn write_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::fs;
    use stylebook_adapters::AdapterRegistry;
    use stylebook_core::{AdapterConfig, Config, Resolver};
    use tempfile::{tempdir, TempDir};

    fn write(path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn write_project(root: &Path) {
        write(
            root.join("templates/stylebook.html"),
            "<!DOCTYPE html><html><head><title><!-- stylebook:title --></title></head><body class=\"<!-- stylebook:class -->\"><!-- stylebook:content --></body></html>",
        );
        write(
            root.join("templates/page.html"),
            "<main>{{ myContext }}</main><!-- stylebook:content -->",
        );

        let components = root.join("components");
        write(components.join("button/component.md"), "# Button");
        write(
            components.join("button/variants/primary.html"),
            "<button>{{ label }}</button>",
        );
        write(
            components.join("button/variants/primary.md"),
            "---\ncontext:\n  label: Go\n---\n",
        );
        write(components.join("input/variants/text.html"), "<input>");
        write(
            components.join("input/variants/text.md"),
            "---\ntemplate: page.html\n---\n",
        );

        let pages = root.join("pages");
        write(pages.join("page.md"), "# Home");
        write(pages.join("prototype/page.md"), "# Prototype");
        write(
            pages.join("prototype/custom-page/page.md"),
            "---\ntitle: Custom Page\ntemplate: page.html\ncontext:\n  myContext: This is my context\n---\n",
        );
        write(
            pages.join("prototype/other-page/page.md"),
            "---\ntemplate: page.html\n---\n",
        );
        write(pages.join("plain/page.md"), "# Plain page");
        write(
            pages.join("tokens/page.md"),
            "---\ntokens:\n  - name: Brand\n    type: color\n    value: '#123456'\n---\n",
        );
        write(pages.join("testcases/page.md"), "");
        write(pages.join("testcases/index.txt"), "index");
        write(
            pages.join("testcases/extra-files/subfolder/file-in-subfolder.txt"),
            "sub",
        );
        write(
            pages.join("testcases/custom-path/page.md"),
            "---\npath: testcases/page-with-custom-path\n---\n",
        );
        write(pages.join("testcases/custom-path/file.txt"), "file");
    }

    async fn fixture(debug: bool) -> (TempDir, State, SiteBuilder) {
        let temp = tempdir().unwrap();
        write_project(temp.path());

        let mut config = Config {
            debug,
            ..Default::default()
        };
        config.source.components = Some(PathBuf::from("components"));
        config.source.templates = Some(PathBuf::from("templates"));
        config.source.pages = Some(PathBuf::from("pages"));
        config
            .adapters
            .insert("html".to_string(), AdapterConfig::module("html"));
        let config = config.resolve_paths(temp.path());

        let connector =
            Arc::new(Connector::setup(&config, &AdapterRegistry::with_builtins()).unwrap());
        let resolver = Resolver::from_shared(Arc::new(config), Arc::clone(&connector));
        let state = State::resolve(&resolver).await.unwrap();
        let builder = SiteBuilder::new(connector).unwrap();

        (temp, state, builder)
    }

    fn read(path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut dirs = vec![root.to_path_buf()];
        while let Some(dir) = dirs.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    dirs.push(path);
                } else {
                    let contents = fs::read(&path).unwrap();
                    files.insert(path.strip_prefix(root).unwrap().to_path_buf(), contents);
                }
            }
        }
        files
    }

    #[test]
    fn fills_placeholders() {
        let html = fill_placeholders(
            "<title><!-- stylebook:title --></title><body class=\"<!-- stylebook:class -->\"><!-- stylebook:content --></body>",
            "Primary",
            "stylebook",
            "<p><!-- stylebook:title --></p>",
        );

        assert_eq!(
            html,
            "<title>Primary</title><body class=\"stylebook\"><p><!-- stylebook:title --></p></body>"
        );
    }

    #[tokio::test]
    async fn refuses_to_clear_the_project() {
        let (temp, mut state, builder) = fixture(false).await;
        state.config.target = temp.path().to_path_buf();

        let err = builder.generate(&state).await.unwrap_err();

        assert!(matches!(err, BuildError::UnsafeTarget { .. }));
        assert!(temp.path().join("templates/stylebook.html").exists());
    }

    #[tokio::test]
    async fn refuses_to_clear_a_source_directory() {
        let (temp, mut state, builder) = fixture(false).await;
        let pages = temp.path().join("pages");
        state.config.target = pages.clone();

        let err = builder.generate(&state).await.unwrap_err();

        match err {
            BuildError::UnsafeTarget { source_dir, .. } => assert_eq!(source_dir, pages),
            other => panic!("unexpected error: {other}"),
        }
        assert!(pages.join("page.md").exists());
    }

    #[tokio::test]
    async fn generates_variant() {
        let (_temp, state, builder) = fixture(false).await;
        let variant = state.variant("button/primary.html").unwrap();

        builder.generate_variant(&state, variant).await.unwrap();

        let html = read(state.config.target.join("_variants/button/primary.html.html"));
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head><title>Primary</title></head><body class=\"stylebook stylebook--variant\"><button>Go</button></body></html>"
        );
    }

    #[tokio::test]
    async fn generates_page_with_custom_template() {
        let (_temp, state, builder) = fixture(false).await;

        builder
            .generate_page_with_template(&state, "prototype/custom-page")
            .await
            .unwrap();

        let html = read(state.config.target.join("_pages/prototype/custom-page.html"));
        assert!(html.contains("This is my context"));
    }

    #[tokio::test]
    async fn page_without_template_uses_default() {
        let (_temp, state, builder) = fixture(false).await;

        builder
            .generate_page_with_template(&state, "plain")
            .await
            .unwrap();

        let html = read(state.config.target.join("_pages/plain.html"));
        assert!(html.contains("<title>Plain page</title>"));
        assert!(html.contains("stylebook--page"));
    }

    #[tokio::test]
    async fn generates_only_pages_with_the_template() {
        let (_temp, state, builder) = fixture(false).await;

        let ids = builder
            .generate_pages_with_template(&state, "page.html")
            .await
            .unwrap();

        assert_eq!(ids, vec!["prototype/custom-page", "prototype/other-page"]);
        let target = &state.config.target;
        assert!(target.join("_pages/prototype/custom-page.html").exists());
        assert!(target.join("_pages/prototype/other-page.html").exists());
        assert!(!target.join("_pages/plain.html").exists());
        assert!(!target.join("_pages/index.html").exists());
    }

    #[tokio::test]
    async fn generates_page_with_tokens() {
        let (_temp, state, builder) = fixture(false).await;

        builder
            .generate_page_with_tokens(&state, "tokens")
            .await
            .unwrap();

        assert!(read(state.config.target.join("_tokens/tokens.html")).contains("#123456"));
    }

    #[tokio::test]
    async fn copies_page_files() {
        let (_temp, state, builder) = fixture(false).await;
        let target = &state.config.target;

        builder
            .generate_page_files(&state, "testcases")
            .await
            .unwrap();
        builder
            .generate_page_files(&state, "testcases/custom-path")
            .await
            .unwrap();

        assert_eq!(read(target.join("testcases/index.txt")), "index");
        assert!(target
            .join("testcases/extra-files/subfolder/file-in-subfolder.txt")
            .exists());
        assert_eq!(
            read(target.join("testcases/page-with-custom-path/file.txt")),
            "file"
        );
        assert!(!target.join("testcases/custom-path").exists());
    }

    #[tokio::test]
    async fn generates_variants_by_template_and_component() {
        let (_temp, state, builder) = fixture(false).await;
        let target = &state.config.target;

        let ids = builder
            .generate_variants_with_template(&state, "page.html")
            .await
            .unwrap();
        assert_eq!(ids, vec!["input/text.html"]);
        assert!(target.join("_variants/input/text.html.html").exists());
        assert!(!target.join("_variants/button/primary.html.html").exists());

        let count = builder
            .generate_component_variants(&state, "button")
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(target.join("_variants/button/primary.html.html").exists());

        assert!(matches!(
            builder.generate_component_variants(&state, "missing").await,
            Err(BuildError::UnknownComponent(_))
        ));
    }

    #[tokio::test]
    async fn full_build() {
        let (_temp, state, builder) = fixture(false).await;
        let target = &state.config.target;

        let result = builder.generate(&state).await.unwrap();

        assert_eq!(result.pages, 3);
        assert_eq!(result.variants, 2);
        assert!(target.join("_assets/styles/stylebook.css").exists());
        assert!(target.join("_assets/scripts/stylebook.js").exists());
        assert!(target.join("_variants/button/primary.html.html").exists());
        assert!(target.join("_tokens/tokens.html").exists());
        assert!(target.join("testcases/index.txt").exists());
        assert!(read(target.join("_sketch.html")).contains("button/primary.html"));
        assert!(!target.join("_state.json").exists());

        let index = read(target.join("index.html"));
        let start = index
            .find("<script id=\"stylebook-state\" type=\"application/json\">")
            .unwrap();
        let json = &index[start..];
        let json = &json[json.find('>').unwrap() + 1..json.find("</script>").unwrap()];
        let embedded: Value = serde_json::from_str(json).unwrap();
        assert_eq!(
            embedded["components"]["button"]["variants"][0]["id"],
            "button/primary.html"
        );
        assert_eq!(embedded["config"]["update"], 0);
    }

    #[tokio::test]
    async fn debug_build_dumps_state() {
        let (_temp, state, builder) = fixture(true).await;

        builder.generate(&state).await.unwrap();

        let dump: State =
            serde_json::from_str(&read(state.config.target.join("_state.json"))).unwrap();
        assert_eq!(dump.components.len(), 2);
        assert_eq!(dump.pages.len(), state.pages.len());
    }

    #[tokio::test]
    async fn builds_are_idempotent() {
        let (_temp, state, builder) = fixture(false).await;

        builder.generate(&state).await.unwrap();
        let first = tree(&state.config.target);
        builder.generate(&state).await.unwrap();
        let second = tree(&state.config.target);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_page_template_adapter_is_fatal() {
        let (_temp, mut state, builder) = fixture(false).await;
        state
            .pages
            .get_mut("plain")
            .unwrap()
            .template = Some("page.pug".to_string());

        let result = builder.generate_increment(&state).await;

        assert!(matches!(
            result,
            Err(BuildError::Render {
                source: ConnectorError::AdapterMissing { .. },
                ..
            })
        ));
    }
}
