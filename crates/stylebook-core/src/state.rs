//! The resolved state handed to the builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::{self, Component};
use crate::config::Config;
use crate::entity::{self, Entity};
use crate::error::ResolveError;
use crate::navigation::{self, NavigationItem};
use crate::page::{self, Page};
use crate::resolver::Resolver;
use crate::variant::Variant;

/// Everything known about a project after resolution.
///
/// Maps are ordered by id so serializing the state is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub config: Config,
    pub pages: BTreeMap<String, Page>,
    pub navigation: BTreeMap<String, NavigationItem>,
    pub components: BTreeMap<String, Component>,
    pub entities: BTreeMap<String, Entity>,
}

impl State {
    /// Resolve pages, components and entities concurrently and derive the
    /// navigation from the result.
    pub async fn resolve(resolver: &Resolver) -> Result<Self, ResolveError> {
        tracing::info!("Resolving {}", resolver.config().name);

        let (pages, components, entities) = tokio::try_join!(
            page::fetch_all(resolver),
            component::fetch_all(resolver),
            entity::fetch_all(resolver)
        )?;

        let navigation = navigation::from_pages(&pages, &components);

        tracing::info!(
            "Resolved {} pages, {} components and {} entities",
            pages.len(),
            components.len(),
            entities.len()
        );

        Ok(Self {
            config: resolver.config().clone(),
            pages,
            navigation,
            components,
            entities,
        })
    }

    /// All variants of all components, in component order.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.components
            .values()
            .flat_map(|component| component.variants.iter())
    }

    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants().find(|variant| variant.id == id)
    }
}
