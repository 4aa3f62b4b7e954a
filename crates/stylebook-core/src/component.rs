//! Component discovery and resolution.
//!
//! Every immediate subdirectory of the components root is a component. Its
//! `component.md` documents it, other files with an adapter extension are
//! registered with their adapter, and `variants/` holds its variants.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ResolveError;
use crate::merge::{merge_deep_left, without_keys};
use crate::reader::{read_markdown, Metadata};
use crate::resolver::Resolver;
use crate::util;
use crate::variant::{self, Variant};

const RESERVED_KEYS: &[&str] = &["id", "title", "content", "variants", "path", "type"];

/// A resolved component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub title: String,
    /// Rendered markdown documentation
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Public path, `patterns/<id>`
    pub path: String,
    #[serde(rename = "type", default = "component_kind")]
    pub kind: String,
    /// Frontmatter attributes with adapter contributed data merged in
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn component_kind() -> String {
    "component".to_string()
}

/// Ids of all components, sorted. Empty without a components source.
pub fn find_component_ids(config: &Config) -> Vec<String> {
    let Some(components) = config.source.components.as_deref() else {
        return Vec::new();
    };

    let mut ids: Vec<String> = WalkDir::new(components)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !util::is_hidden(entry))
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| util::component_path_to_id(components, entry.path()))
        .collect();

    ids.sort();
    ids
}

/// Read a component's `component.md`.
pub async fn read_component_file(file_path: &Path) -> Metadata {
    read_markdown(file_path).await
}

/// Register the files in a component's directory with their adapters.
///
/// Only files directly inside the directory whose extension has an adapter
/// are considered. Registrations without data are dropped; the rest keep
/// file name order.
pub async fn register_component_files(
    resolver: &Resolver,
    id: &str,
) -> Result<Vec<Value>, ResolveError> {
    let Some(components) = resolver.config().source.components.as_deref() else {
        return Ok(Vec::new());
    };

    let mut paths: Vec<_> = WalkDir::new(util::component_id_to_dir(components, id))
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_entry(|entry| !util::is_hidden(entry))
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| resolver.connector().has_adapter(ext))
        })
        .collect();
    paths.sort();

    let mut tasks = JoinSet::new();
    for (index, path) in paths.into_iter().enumerate() {
        let resolver = resolver.clone();
        tasks.spawn(async move {
            let data = resolver.connector().register_component_file(&path).await;
            (index, data)
        });
    }

    let mut registrations = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, data) = joined?;
        if let Some(data) = data? {
            registrations.push((index, data));
        }
    }
    registrations.sort_by_key(|(index, _)| *index);

    Ok(registrations.into_iter().map(|(_, data)| data).collect())
}

/// Resolve a component with its variants.
pub async fn fetch_by_id(resolver: &Resolver, id: &str) -> Result<Component, ResolveError> {
    let components = resolver
        .config()
        .source
        .components
        .as_deref()
        .ok_or(ResolveError::MissingSource("components"))?;

    tracing::debug!("Resolving component {}", id);

    let file_path = util::component_id_to_file_path(components, id);
    let (metadata, registrations) = tokio::join!(
        read_component_file(&file_path),
        register_component_files(resolver, id)
    );
    let registrations = registrations?;
    let (mut attributes, document) = metadata.into_parts();

    let variants = variant::fetch_for_component(
        resolver,
        id,
        attributes.get("context"),
        attributes.get("variants"),
    )
    .await?;

    let title = attributes
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| document.as_ref().and_then(|d| d.title.clone()))
        .unwrap_or_else(|| util::component_id_to_title(id));

    for data in registrations {
        match data {
            Value::Object(data) => merge_deep_left(&mut attributes, data),
            other => tracing::warn!(
                "Ignoring non-object file data for component \"{}\": {}",
                id,
                other
            ),
        }
    }

    Ok(Component {
        id: id.to_string(),
        title,
        content: document.map(|d| d.content),
        variants,
        path: util::component_id_to_path(id),
        kind: component_kind(),
        extra: without_keys(attributes, RESERVED_KEYS),
    })
}

/// Resolve all components, keyed by id.
pub async fn fetch_all(resolver: &Resolver) -> Result<BTreeMap<String, Component>, ResolveError> {
    let mut tasks = JoinSet::new();
    for id in find_component_ids(resolver.config()) {
        let resolver = resolver.clone();
        tasks.spawn(async move { fetch_by_id(&resolver, &id).await });
    }

    let mut components = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let component = joined??;
        components.insert(component.id.clone(), component);
    }

    tracing::debug!("Resolved {} components", components.len());

    Ok(components)
}
