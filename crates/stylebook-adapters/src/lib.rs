//! Template engine adapters.
//!
//! An adapter turns a template file of one extension into rendered HTML.
//! Adapters expose their optional capabilities (setup, render, component file
//! registration, scaffolding) through the [`Adapter`] trait; the
//! [`AdapterRegistry`] maps configured module names to adapter instances.

pub mod cache;
pub mod html;
pub mod jinja;
pub mod registry;
pub mod traits;

pub use cache::TemplateCache;
pub use html::HtmlAdapter;
pub use jinja::JinjaAdapter;
pub use registry::{AdapterRegistry, RegistryError};
pub use traits::{
    Adapter, AdapterError, AdapterOptions, RegisterComponentFile, Render, RenderOutput,
    RenderPart, Rendered, Scaffold, ScaffoldFile, Setup,
};
