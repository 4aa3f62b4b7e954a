//! Variant discovery and resolution.
//!
//! A variant is a template file inside `<component>/variants/`. A markdown
//! file with the same stem documents it and may set a `title`, a preview
//! `template` and the `context` the template is rendered with.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stylebook_adapters::RenderPart;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ResolveError;
use crate::merge::{merge_context, without_keys};
use crate::omit::{omit, CODE, PREVIEW};
use crate::reader::{read_markdown, Metadata};
use crate::resolver::Resolver;
use crate::util;

/// Keys computed by the resolver. Frontmatter cannot override them.
const RESERVED_KEYS: &[&str] = &[
    "id",
    "componentId",
    "file",
    "path",
    "title",
    "template",
    "content",
    "raw",
    "rendered",
    "parts",
    "context",
    "extension",
];

/// A resolved variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// `<componentId>/<file>`
    pub id: String,
    pub component_id: String,
    /// File name of the template, including its extension
    pub file: String,
    /// Absolute path of the template
    pub path: PathBuf,
    pub title: String,
    /// Preview template overriding the project default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Rendered markdown documentation
    #[serde(default)]
    pub content: Option<String>,
    /// Template source with `code` omit regions removed
    #[serde(default)]
    pub raw: Option<String>,
    /// Rendered HTML with `preview` omit regions removed, or an error document
    pub rendered: String,
    #[serde(default)]
    pub parts: Vec<RenderPart>,
    /// Data the template was rendered with
    #[serde(default)]
    pub context: Value,
    pub extension: String,
    /// Remaining frontmatter attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Variant ids below one component, or below all components.
///
/// Markdown files are documentation of their sibling template and never
/// count as variants.
pub fn find_variant_ids(config: &Config, component_id: Option<&str>) -> Vec<String> {
    let Some(components) = config.source.components.as_deref() else {
        return Vec::new();
    };

    let (root, depth) = match component_id {
        Some(id) => (util::component_id_to_variants_path(components, id), 1),
        None => (components.to_path_buf(), 3),
    };

    let mut ids: Vec<String> = WalkDir::new(&root)
        .min_depth(depth)
        .max_depth(depth)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !util::is_hidden(entry))
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) != Some("md"))
        .filter_map(|entry| util::variant_file_path_to_id(components, entry.path()))
        .collect();

    ids.sort();
    ids
}

/// Read the markdown documentation next to a variant template.
pub async fn read_variant_file(file_path: &Path) -> Metadata {
    read_markdown(&file_path.with_extension("md")).await
}

/// Resolve a single variant by id.
pub async fn fetch_by_id(resolver: &Resolver, id: &str) -> Result<Variant, ResolveError> {
    fetch(resolver, id, None).await
}

/// Resolve the variants of a component.
///
/// `context` is the component's default render context; each variant's own
/// context is merged over it. A `declared` list of file names (or maps with a
/// `file` key) selects and orders the variants.
pub async fn fetch_for_component(
    resolver: &Resolver,
    component_id: &str,
    context: Option<&Value>,
    declared: Option<&Value>,
) -> Result<Vec<Variant>, ResolveError> {
    let found = find_variant_ids(resolver.config(), Some(component_id));
    let ids = match declared.and_then(Value::as_array) {
        Some(entries) => select_declared(component_id, &found, entries),
        None => found,
    };

    let mut tasks = JoinSet::new();
    for (index, id) in ids.into_iter().enumerate() {
        let resolver = resolver.clone();
        let context = context.cloned();
        tasks.spawn(async move {
            let variant = fetch(&resolver, &id, context.as_ref()).await;
            (index, variant)
        });
    }

    let mut variants = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, variant) = joined?;
        variants.push((index, variant?));
    }
    variants.sort_by_key(|(index, _)| *index);

    Ok(variants.into_iter().map(|(_, variant)| variant).collect())
}

/// Resolve every variant of every component, keyed by id.
pub async fn fetch_all(resolver: &Resolver) -> Result<BTreeMap<String, Variant>, ResolveError> {
    let mut tasks = JoinSet::new();
    for id in find_variant_ids(resolver.config(), None) {
        let resolver = resolver.clone();
        tasks.spawn(async move { fetch(&resolver, &id, None).await });
    }

    let mut variants = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let variant = joined??;
        variants.insert(variant.id.clone(), variant);
    }

    Ok(variants)
}

fn select_declared(component_id: &str, found: &[String], entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(file) => Some(file.as_str()),
            Value::Object(map) => map.get("file").and_then(Value::as_str),
            _ => None,
        })
        .filter_map(|file| {
            let id = format!("{}/{}", component_id, file);
            if found.contains(&id) {
                Some(id)
            } else {
                tracing::warn!(
                    "Component \"{}\" declares unknown variant \"{}\"",
                    component_id,
                    file
                );
                None
            }
        })
        .collect()
}

async fn fetch(
    resolver: &Resolver,
    id: &str,
    defaults: Option<&Value>,
) -> Result<Variant, ResolveError> {
    let components = resolver
        .config()
        .source
        .components
        .as_deref()
        .ok_or(ResolveError::MissingSource("components"))?;

    tracing::debug!("Resolving variant {}", id);

    let component_id = util::variant_id_to_component_id(id).to_string();
    let file = util::variant_id_to_file_name(id).to_string();
    let file_path = util::variant_id_to_file_path(components, id);
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();

    let (mut attributes, document) = read_variant_file(&file_path).await.into_parts();
    let context = merge_context(defaults, attributes.remove("context"));
    let data = context
        .clone()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let (raw, rendered) = tokio::join!(
        tokio::fs::read_to_string(&file_path),
        resolver.connector().render(&file_path, &data)
    );

    let raw = match raw {
        Ok(raw) => Some(omit(CODE, &raw)),
        Err(e) => {
            tracing::warn!("Could not read variant {}: {}", file_path.display(), e);
            None
        }
    };

    let (rendered, parts) = match rendered {
        Ok(output) => {
            let parts = output
                .parts
                .into_iter()
                .map(|part| RenderPart {
                    content: omit(CODE, &part.content),
                    ..part
                })
                .collect();
            (omit(PREVIEW, &output.rendered), parts)
        }
        Err(e) => {
            tracing::error!("Variant \"{}\" could not be rendered!\n\n{}", id, e);
            (error_document(&e.to_string()), Vec::new())
        }
    };

    let title = match attributes.get("title").and_then(Value::as_str) {
        Some(title) => title.to_string(),
        None => util::variant_id_to_title(id),
    };
    let template = attributes
        .get("template")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Variant {
        id: id.to_string(),
        component_id,
        file,
        path: file_path,
        title,
        template,
        content: document.map(|d| d.content),
        raw,
        rendered,
        parts,
        context: context.unwrap_or(Value::Null),
        extension,
        extra: without_keys(attributes, RESERVED_KEYS),
    })
}

/// Minimal HTML page showing a render error in place of the preview.
fn error_document(message: &str) -> String {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html><html><body><pre>{}</pre></body></html>",
        escaped
    )
}
