//! Initialize a stylebook project.

use std::path::Path;

use anyhow::{Context, Result};
use stylebook_core::util::titleize;

use super::{report_created, write_file};
use crate::config::project_root;

/// Run the init command.
///
/// Writes the config file next to `config_path` plus the home page and the
/// preview template it refers to. Existing files are kept unless `yes` is set.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    let root = project_root(config_path);
    let name = project_name(&root)?;

    tracing::info!("Initializing {}...", name);

    let config = DEFAULT_CONFIG.replace("{name}", &toml::Value::String(name.clone()).to_string());

    let files = [
        (config_path.to_path_buf(), config),
        (
            root.join("src/stylebook/pages/page.md"),
            DEFAULT_HOMEPAGE.replace("{name}", &name),
        ),
        (
            root.join("src/templates/stylebook.html"),
            DEFAULT_PREVIEW.to_string(),
        ),
    ];

    let mut created = Vec::new();
    for (path, contents) in &files {
        if write_file(path, contents, yes).await? {
            created.push(path.clone());
        }
    }

    for dir in [
        "src/components",
        "src/stylebook/entities",
        "src/stylebook/data",
    ] {
        let dir = root.join(dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    tracing::info!("Initialized {}", name);
    report_created(&root, &created);
    tracing::info!("Run 'stylebook component <name>' to add a component, then 'stylebook build'.");

    Ok(())
}

/// Project name derived from the project directory.
fn project_name(root: &Path) -> Result<String> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;

    let name = root
        .file_name()
        .and_then(|name| name.to_str())
        .map(titleize)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Stylebook".to_string());

    Ok(name)
}

const DEFAULT_CONFIG: &str = r#"# Stylebook configuration

# Project name and version shown in the UI
name = {name}
version = "0.1.0"

# Output directory for the built style guide
target = "dist"

# Template used to preview variants, relative to the templates directory
template = "stylebook.html"

[source]
components = "src/components"
templates = "src/templates"
pages = "src/stylebook/pages"
entities = "src/stylebook/entities"
data = "src/stylebook/data"

# Adapters by file extension
[adapters]
html = "stylebook-adapter-html"
"#;

const DEFAULT_HOMEPAGE: &str = r#"---
title: {name}
---

# {name}

It looks like you have just set up this project.

Add components with `stylebook component <name> [variants...]` and pages
with `stylebook page <id>`, then run `stylebook build`.
"#;

const DEFAULT_PREVIEW: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title><!-- stylebook:title --></title>
  <style>
    /* add your custom styles here */
  </style>
</head>
<body class="<!-- stylebook:class -->">
  <!-- stylebook:content -->
  <script>
    /* add your custom scripts here */
  </script>
</body>
</html>
"#;
