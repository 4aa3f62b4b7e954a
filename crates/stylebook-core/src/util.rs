//! Mapping between filesystem paths and logical ids.
//!
//! Layout of a project:
//!
//! ```text
//! <components>/<componentId>/component.md
//! <components>/<componentId>/variants/<file>      variant id: <componentId>/<file>
//! <pages>/page.md                                 page id: index
//! <pages>/<pageId>/page.md
//! <entities>/<entityId>.yml
//! ```

use std::path::{Component, Path, PathBuf};

use walkdir::DirEntry;

/// Metadata file inside a component directory.
pub const COMPONENT_FILENAME: &str = "component.md";

/// Directory holding a component's variants.
pub const VARIANTS_DIRNAME: &str = "variants";

/// Metadata file marking a page directory.
pub const PAGE_FILENAME: &str = "page.md";

/// Id of the page at the root of the pages directory.
pub const INDEX_PAGE_ID: &str = "index";

/// Turn an id segment like `button-group` into `Button Group`.
pub fn titleize(s: &str) -> String {
    s.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dotfiles and hidden directories below the walk root (`.DS_Store`,
/// `.git`) are never sources. The root itself may be hidden.
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Segments of `path` relative to `root`.
fn relative_id(root: &Path, path: &Path) -> Option<Vec<String>> {
    let relative = path.strip_prefix(root).ok()?;
    relative
        .components()
        .map(|c| match c {
            Component::Normal(segment) => segment.to_str().map(str::to_string),
            _ => None,
        })
        .collect()
}

fn last_segment(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

// Components

pub fn component_path_to_id(root: &Path, component_dir: &Path) -> Option<String> {
    match relative_id(root, component_dir)?.as_slice() {
        [id] => Some(id.clone()),
        _ => None,
    }
}

pub fn component_id_to_dir(root: &Path, id: &str) -> PathBuf {
    root.join(id)
}

/// Path of the component's metadata file.
pub fn component_id_to_file_path(root: &Path, id: &str) -> PathBuf {
    component_id_to_dir(root, id).join(COMPONENT_FILENAME)
}

/// Id of the component owning any file inside its directory.
pub fn component_file_path_to_id(root: &Path, file_path: &Path) -> Option<String> {
    relative_id(root, file_path)?.into_iter().next()
}

/// Public URL path of a component.
pub fn component_id_to_path(id: &str) -> String {
    format!("patterns/{}", id)
}

pub fn component_id_to_title(id: &str) -> String {
    titleize(last_segment(id))
}

pub fn component_id_to_variants_path(root: &Path, id: &str) -> PathBuf {
    component_id_to_dir(root, id).join(VARIANTS_DIRNAME)
}

// Variants

pub fn variant_id_to_component_id(id: &str) -> &str {
    id.rsplit_once('/').map(|(component, _)| component).unwrap_or(id)
}

pub fn variant_id_to_file_name(id: &str) -> &str {
    last_segment(id)
}

pub fn variant_id_to_file_path(root: &Path, id: &str) -> PathBuf {
    component_id_to_variants_path(root, variant_id_to_component_id(id))
        .join(variant_id_to_file_name(id))
}

pub fn variant_file_path_to_id(root: &Path, file_path: &Path) -> Option<String> {
    match relative_id(root, file_path)?.as_slice() {
        [component, variants, file] if variants == VARIANTS_DIRNAME => {
            Some(format!("{}/{}", component, file))
        }
        _ => None,
    }
}

/// Title from the variant file name without its extension.
pub fn variant_id_to_title(id: &str) -> String {
    let file = variant_id_to_file_name(id);
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file);
    titleize(stem)
}

// Entities

pub fn entity_id_to_title(id: &str) -> String {
    titleize(last_segment(id))
}

pub fn entity_id_to_file_path(root: &Path, id: &str) -> PathBuf {
    root.join(format!("{}.yml", id))
}

/// Returns `None` for files outside the entities directory or without a
/// `.yml` extension.
pub fn entity_file_path_to_id(root: &Path, file_path: &Path) -> Option<String> {
    let segments = relative_id(root, file_path)?;
    let file = segments.last()?;
    file.strip_suffix(".yml").map(str::to_string)
}

// Pages

/// Public path of a page, without leading or trailing slash.
pub fn page_id_to_path(id: &str) -> String {
    if id == INDEX_PAGE_ID {
        String::new()
    } else {
        id.to_string()
    }
}

pub fn page_id_to_source_dir(root: &Path, id: &str) -> PathBuf {
    if id == INDEX_PAGE_ID {
        root.to_path_buf()
    } else {
        root.join(id)
    }
}

pub fn page_id_to_file_path(root: &Path, id: &str) -> PathBuf {
    page_id_to_source_dir(root, id).join(PAGE_FILENAME)
}

pub fn page_file_path_to_id(root: &Path, file_path: &Path) -> Option<String> {
    let segments = relative_id(root, file_path)?;
    let (file, dirs) = segments.split_last()?;
    if file != PAGE_FILENAME {
        return None;
    }

    if dirs.is_empty() {
        Some(INDEX_PAGE_ID.to_string())
    } else {
        Some(dirs.join("/"))
    }
}

pub fn page_id_to_title(id: &str) -> String {
    if id == INDEX_PAGE_ID {
        "Home".to_string()
    } else {
        titleize(last_segment(id))
    }
}

/// Candidate parent ids of a page, nearest first, ending with the index page.
pub fn page_ancestor_ids(id: &str) -> Vec<String> {
    if id == INDEX_PAGE_ID {
        return Vec::new();
    }

    let mut ancestors = Vec::new();
    let mut current = id;
    while let Some((parent, _)) = current.rsplit_once('/') {
        ancestors.push(parent.to_string());
        current = parent;
    }
    ancestors.push(INDEX_PAGE_ID.to_string());
    ancestors
}
