//! Navigation tree derived from the page tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::page::Page;
use crate::util;

/// A node of the navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub id: String,
    /// Id of the page or component this node shows
    pub item_id: String,
    pub title: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub child_ids: Vec<String>,
}

/// Build the navigation from pages.
///
/// Each page becomes a node with the same id. Components a page lists in
/// `componentIds` become child nodes `<pageId>/<componentId>` after the
/// page's own children. Unknown component ids are skipped.
pub fn from_pages(
    pages: &BTreeMap<String, Page>,
    components: &BTreeMap<String, Component>,
) -> BTreeMap<String, NavigationItem> {
    let mut navigation = BTreeMap::new();

    for page in pages.values() {
        let mut child_ids: Vec<String> = page
            .child_ids
            .iter()
            .filter(|id| pages.contains_key(*id))
            .cloned()
            .collect();

        for component_id in &page.component_ids {
            let Some(component) = components.get(component_id) else {
                tracing::warn!(
                    "Page \"{}\" lists unknown component \"{}\"",
                    page.id,
                    component_id
                );
                continue;
            };

            let id = format!("{}/{}", page.id, component.id);
            child_ids.push(id.clone());
            navigation.insert(
                id.clone(),
                NavigationItem {
                    id,
                    item_id: component.id.clone(),
                    title: component.title.clone(),
                    path: util::component_id_to_path(&component.id),
                    kind: component.kind.clone(),
                    parent_id: Some(page.id.clone()),
                    child_ids: Vec::new(),
                },
            );
        }

        navigation.insert(
            page.id.clone(),
            NavigationItem {
                id: page.id.clone(),
                item_id: page.id.clone(),
                title: page.title.clone(),
                path: page.path.clone(),
                kind: page.kind.as_str().to_string(),
                parent_id: None,
                child_ids,
            },
        );
    }

    let links: Vec<(String, String)> = navigation
        .values()
        .filter(|item| pages.contains_key(&item.id))
        .flat_map(|item| {
            item.child_ids
                .iter()
                .filter(|child| pages.contains_key(*child))
                .map(|child| (child.clone(), item.id.clone()))
                .collect::<Vec<_>>()
        })
        .collect();
    for (child, parent) in links {
        if let Some(item) = navigation.get_mut(&child) {
            item.parent_id = Some(parent);
        }
    }

    navigation
}
