//! Page discovery and resolution.
//!
//! Every directory below the pages root holding a `page.md` is a page. The
//! root itself is the `index` page. Pages nest by directory: the parent of a
//! page is its nearest ancestor directory that is a page too.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::error::ResolveError;
use crate::merge::without_keys;
use crate::reader::read_markdown;
use crate::resolver::Resolver;
use crate::util::{self, INDEX_PAGE_ID, PAGE_FILENAME};

const RESERVED_KEYS: &[&str] = &[
    "id",
    "title",
    "path",
    "type",
    "content",
    "template",
    "context",
    "files",
    "childIds",
    "children",
    "componentIds",
    "tokens",
];

/// How a page is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Documentation page, optionally rendered with a custom template
    #[default]
    Page,
    /// Design token listing
    Tokens,
    /// Entity schema listing
    Entities,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Page => "page",
            PageType::Tokens => "tokens",
            PageType::Entities => "entities",
        }
    }
}

/// A named design value listed on a tokens page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resolved page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    /// Public path without leading or trailing slash
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: PageType,
    #[serde(default)]
    pub content: Option<String>,
    /// Custom template, relative to the templates directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub context: Value,
    /// Attached files to publish below the page's path
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub component_ids: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// A page with only the values derived from its id.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: util::page_id_to_title(id),
            path: util::page_id_to_path(id),
            kind: PageType::Page,
            content: None,
            template: None,
            context: Value::Null,
            files: Vec::new(),
            child_ids: Vec::new(),
            component_ids: Vec::new(),
            tokens: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Ids of all pages below `root`, sorted.
pub fn find_page_ids(root: &Path) -> Vec<String> {
    let mut ids: Vec<String> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !util::is_hidden(entry))
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == PAGE_FILENAME)
        .filter(|entry| !shadows_root_page(root, entry.path()))
        .filter_map(|entry| util::page_file_path_to_id(root, entry.path()))
        .collect();

    ids.sort();
    ids
}

/// `index/page.md` maps to the same id as the root page and is ignored.
fn shadows_root_page(root: &Path, file: &Path) -> bool {
    let shadows = file == root.join(INDEX_PAGE_ID).join(PAGE_FILENAME);
    if shadows {
        tracing::warn!(
            "Ignoring {}: the `{}` page id belongs to the pages root",
            file.display(),
            INDEX_PAGE_ID
        );
    }
    shadows
}

/// Files attached to a page: everything in its directory except the page
/// file itself and the directories of nested pages.
pub fn find_page_files(root: &Path, id: &str) -> Vec<PathBuf> {
    let dir = util::page_id_to_source_dir(root, id);

    let mut files: Vec<PathBuf> = WalkDir::new(&dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            !util::is_hidden(entry)
                && (!entry.file_type().is_dir() || !entry.path().join(PAGE_FILENAME).is_file())
        })
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !(entry.depth() == 1 && entry.file_name() == PAGE_FILENAME))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read a single page.
pub async fn fetch_by_id(root: &Path, id: &str) -> Page {
    let file_path = util::page_id_to_file_path(root, id);
    let (mut attributes, document) = read_markdown(&file_path).await.into_parts();

    let mut page = Page::new(id);

    if let Some(title) = attributes
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| document.as_ref().and_then(|d| d.title.clone()))
    {
        page.title = title;
    }
    if let Some(path) = attributes.get("path").and_then(Value::as_str) {
        page.path = path.trim_matches('/').to_string();
    }
    page.template = attributes
        .get("template")
        .and_then(Value::as_str)
        .map(str::to_string);
    page.context = attributes.remove("context").unwrap_or(Value::Null);
    page.component_ids = string_list(attributes.get("componentIds"));

    if let Some(tokens) = attributes.remove("tokens") {
        match serde_json::from_value::<Vec<Token>>(tokens) {
            Ok(tokens) => page.tokens = tokens,
            Err(e) => tracing::warn!("Ignoring invalid tokens of page \"{}\": {}", id, e),
        }
    }

    page.kind = match attributes.get("type").cloned() {
        Some(kind) => serde_json::from_value(kind).unwrap_or_else(|e| {
            tracing::warn!("Unknown type of page \"{}\": {}", id, e);
            PageType::Page
        }),
        None if !page.tokens.is_empty() => PageType::Tokens,
        None => PageType::Page,
    };

    // Declared order, completed later with the discovered children.
    page.child_ids = string_list(attributes.get("children"));
    page.content = document.map(|d| d.content);
    page.files = find_page_files(root, id);
    page.extra = without_keys(attributes, RESERVED_KEYS);

    page
}

/// Read all pages, keyed by id, with their child ids resolved.
///
/// Without a pages source, or without a root `page.md`, a default index page
/// is provided.
pub async fn fetch_all(resolver: &Resolver) -> Result<BTreeMap<String, Page>, ResolveError> {
    let mut pages = BTreeMap::new();

    if let Some(root) = resolver.config().source.pages.clone() {
        let mut tasks = JoinSet::new();
        for id in find_page_ids(&root) {
            let root = root.clone();
            tasks.spawn(async move { fetch_by_id(&root, &id).await });
        }

        while let Some(joined) = tasks.join_next().await {
            let page = joined?;
            pages.insert(page.id.clone(), page);
        }
    }

    pages
        .entry(INDEX_PAGE_ID.to_string())
        .or_insert_with(|| Page::new(INDEX_PAGE_ID));

    link_children(&mut pages);

    tracing::debug!("Resolved {} pages", pages.len());

    Ok(pages)
}

/// Fill in child ids from the directory structure.
///
/// Children listed in a page's `children` attribute come first in the
/// declared order, the remaining children follow sorted by id.
fn link_children(pages: &mut BTreeMap<String, Page>) {
    let ids: BTreeSet<String> = pages.keys().cloned().collect();

    let mut discovered: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for id in &ids {
        if let Some(parent) = util::page_ancestor_ids(id)
            .into_iter()
            .find(|ancestor| ids.contains(ancestor))
        {
            discovered.entry(parent).or_default().push(id.clone());
        }
    }

    for (id, page) in pages.iter_mut() {
        let children = discovered.remove(id).unwrap_or_default();
        let declared = std::mem::take(&mut page.child_ids);

        let declared = declared
            .iter()
            .map(|child| qualify_child(id, child))
            .filter(|child| children.contains(child));

        let mut child_ids: Vec<String> = Vec::with_capacity(children.len());
        for child in declared.chain(children.iter().cloned()) {
            if !child_ids.contains(&child) {
                child_ids.push(child);
            }
        }

        page.child_ids = child_ids;
    }
}

/// Declared children may be given relative to their parent.
fn qualify_child(parent: &str, child: &str) -> String {
    if parent == INDEX_PAGE_ID || child.starts_with(&format!("{}/", parent)) {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
