//! Discovery and resolution of stylebook sources.
//!
//! Scans the components, pages and entities directories, renders variants
//! through the [`Connector`] and assembles everything into a [`State`] that
//! the static builder consumes.

pub mod component;
pub mod config;
pub mod connector;
pub mod entity;
pub mod error;
pub mod merge;
pub mod navigation;
pub mod omit;
pub mod page;
pub mod reader;
pub mod resolver;
pub mod state;
pub mod util;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_support;

pub use component::Component;
pub use config::{AdapterConfig, Config, SourceConfig};
pub use connector::{Connector, ConnectorError};
pub use entity::{Entity, EntityField};
pub use error::ResolveError;
pub use navigation::NavigationItem;
pub use page::{Page, PageType, Token};
pub use reader::Metadata;
pub use resolver::Resolver;
pub use state::State;
pub use variant::Variant;
