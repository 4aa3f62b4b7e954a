//! Entity schemas read from `<entities>/<Entity>.yml`.
//!
//! Entities are displayed as they are, nothing is validated against them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::util;

/// One field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityField {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Fields of an entity by name.
pub type Entity = BTreeMap<String, EntityField>;

/// Ids of the entity files below `root`, sorted.
pub fn find_entity_ids(root: &Path) -> Vec<String> {
    let mut ids: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_entry(|entry| !util::is_hidden(entry))
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| util::entity_file_path_to_id(root, entry.path()))
        .collect();

    ids.sort();
    ids
}

/// Parse an entity file.
pub async fn read_entity_file(file_path: &Path) -> Result<Entity, ResolveError> {
    let source = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| ResolveError::io(file_path, e))?;

    if source.trim().is_empty() {
        return Ok(Entity::new());
    }

    serde_yaml::from_str(&source).map_err(|e| ResolveError::Parse {
        path: file_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read all entities, keyed by id.
///
/// Files that cannot be read or parsed are skipped with a warning.
pub async fn fetch_all(resolver: &Resolver) -> Result<BTreeMap<String, Entity>, ResolveError> {
    let mut entities = BTreeMap::new();
    let Some(root) = resolver.config().source.entities.as_deref() else {
        return Ok(entities);
    };

    for id in find_entity_ids(root) {
        match read_entity_file(&util::entity_id_to_file_path(root, &id)).await {
            Ok(entity) => {
                entities.insert(id, entity);
            }
            Err(e) => tracing::warn!("Skipping entity \"{}\": {}", id, e),
        }
    }

    Ok(entities)
}
