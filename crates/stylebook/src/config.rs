//! Loading `stylebook.toml`.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use stylebook_core::Config;

/// Directory holding the config file, used as the project root.
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read and resolve the project configuration.
///
/// Relative paths are resolved against the config file's directory and the
/// build timestamp is set to the current time.
pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        bail!(
            "No config found at {}. Run 'stylebook init' to create one.",
            config_path.display()
        );
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    let root = project_root(config_path);
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;

    let mut config = config.resolve_paths(&root);
    config.source.config_file = Some(root.join(config_path.file_name().unwrap_or_default()));
    config.update = timestamp();

    tracing::info!("Loaded config from {}", config_path.display());

    Ok(config)
}

/// Current time in milliseconds.
pub fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use stylebook_core::AdapterConfig;
    use tempfile::tempdir;

    #[test]
    fn loads_and_resolves_paths() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("stylebook.toml");
        fs::write(
            &config_path,
            r#"
name = "Test Project"
target = "dist"

[source]
components = "src/components"
pages = "src/pages"

[adapters]
html = "stylebook-adapter-html"
jinja = { module = "stylebook-adapter-jinja", options = { trim_blocks = true } }
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        let root = temp.path().canonicalize().unwrap();

        assert_eq!(config.name, "Test Project");
        assert_eq!(config.target, root.join("dist"));
        assert_eq!(config.source.base, root);
        assert_eq!(config.source.components, Some(root.join("src/components")));
        assert_eq!(config.source.config_file, Some(root.join("stylebook.toml")));
        assert_eq!(
            config.adapters["html"],
            AdapterConfig::module("stylebook-adapter-html")
        );
        assert_eq!(
            config.adapters["jinja"].options["trim_blocks"],
            serde_json::Value::Bool(true)
        );
        assert!(config.update > 0);
    }

    #[test]
    fn missing_config_suggests_init() {
        let temp = tempdir().unwrap();

        let error = load_config(&temp.path().join("stylebook.toml")).unwrap_err();

        assert!(error.to_string().contains("stylebook init"));
    }

    #[test]
    fn invalid_config_names_the_file() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("stylebook.toml");
        fs::write(&config_path, "name = [").unwrap();

        let error = load_config(&config_path).unwrap_err();

        assert!(error.to_string().contains("Failed to parse"));
    }

    #[test]
    fn bare_file_names_resolve_to_the_current_directory() {
        assert_eq!(project_root(Path::new("stylebook.toml")), PathBuf::from("."));
        assert_eq!(
            project_root(Path::new("site/stylebook.toml")),
            PathBuf::from("site")
        );
    }
}
