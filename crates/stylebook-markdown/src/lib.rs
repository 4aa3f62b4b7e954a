//! Frontmatter and markdown readers.
//!
//! Source files (component docs, variant docs, pages) start with an optional
//! YAML frontmatter block followed by a markdown body. This crate splits the
//! two apart and renders the body to HTML. It performs no I/O.

pub mod frontmatter;
pub mod parser;

pub use frontmatter::{extract_frontmatter, Attributes, FrontmatterError};
pub use parser::{parse_document, Document, ParseError};
