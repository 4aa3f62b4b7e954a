//! Scaffold a component.

use std::path::Path;

use anyhow::{bail, Context, Result};
use stylebook_adapters::AdapterRegistry;
use stylebook_core::util::{
    component_id_to_dir, component_id_to_file_path, component_id_to_title,
    component_id_to_variants_path, titleize,
};
use stylebook_core::Connector;

use super::{report_created, write_file};
use crate::config::load_config;

const DEFAULT_VARIANT: &str = "default";

/// Run the component command.
///
/// Creates `component.md` plus the files the adapter for `ext` scaffolds for
/// the component and each variant. Without `ext` the first configured
/// adapter is used.
pub async fn run(
    config_path: &Path,
    name: &str,
    variants: &[String],
    ext: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(components) = &config.source.components else {
        bail!("No components directory configured in {}", config_path.display());
    };

    let connector = Connector::setup(&config, &AdapterRegistry::with_builtins())
        .context("Failed to set up adapters")?;
    let ext = match ext {
        Some(ext) => ext.trim_start_matches('.').to_string(),
        None => match connector.extensions().first() {
            Some(ext) => ext.to_string(),
            None => bail!("No adapters configured in {}", config_path.display()),
        },
    };
    if !connector.has_adapter(&ext) {
        bail!("No adapter configured for .{} files", ext);
    }

    let metadata_path = component_id_to_file_path(components, name);
    if metadata_path.exists() {
        bail!("Component {} already exists", name);
    }

    let title = component_id_to_title(name);
    let mut created = Vec::new();

    let metadata = format!("---\ntitle: {}\n---\n\n# {}\n", title, title);
    write_file(&metadata_path, &metadata, false).await?;
    created.push(metadata_path);

    let dir = component_id_to_dir(components, name);
    for file in connector.files_for_component(&ext, name) {
        let path = dir.join(&file.basename);
        if write_file(&path, &file.data, false).await? {
            created.push(path);
        }
    }

    let default_variants = [DEFAULT_VARIANT.to_string()];
    let variants = if variants.is_empty() {
        &default_variants[..]
    } else {
        variants
    };

    let variants_dir = component_id_to_variants_path(components, name);
    for variant in variants {
        for file in connector.files_for_variant(&ext, name, variant) {
            let path = variants_dir.join(&file.basename);
            if write_file(&path, &file.data, false).await? {
                created.push(path.clone());
            }

            let metadata_path = path.with_extension("md");
            let metadata = format!("---\ntitle: {}\n---\n", titleize(variant));
            if write_file(&metadata_path, &metadata, false).await? {
                created.push(metadata_path);
            }
        }
    }

    tracing::info!("{} created", title);
    report_created(&config.source.base, &created);

    Ok(())
}
