//! Static site builder for stylebook.
//!
//! Turns a resolved [`stylebook_core::State`] into the output tree: the
//! index page, the sketch page, custom templated pages, token pages, variant
//! previews and copied page files.

pub mod assets;
pub mod builder;
pub mod templates;

pub use assets::AssetPipeline;
pub use builder::{BuildError, BuildResult, SiteBuilder};
pub use templates::{NavEntry, ThemeEngine, ThemeError};
