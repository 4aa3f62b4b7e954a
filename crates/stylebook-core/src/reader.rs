//! Reading markdown metadata files.
//!
//! Component, variant and page metadata is optional. Instead of swallowing
//! failures the reader reports what happened and lets the caller decide.

use std::io;
use std::path::{Path, PathBuf};

use stylebook_markdown::{parse_document, Attributes, Document};

/// Outcome of reading an optional metadata file.
#[derive(Debug, Clone)]
pub enum Metadata {
    /// The file exists and was parsed
    Parsed(Document),
    /// There is no such file
    Absent,
    /// The file exists but could not be read or parsed
    Invalid { path: PathBuf, message: String },
}

impl Metadata {
    /// Split into attributes and rendered content.
    ///
    /// Absent and invalid files yield empty attributes and no content. An
    /// invalid file is logged.
    pub fn into_parts(self) -> (Attributes, Option<Document>) {
        match self {
            Metadata::Parsed(document) => (document.attributes.clone(), Some(document)),
            Metadata::Absent => (Attributes::new(), None),
            Metadata::Invalid { path, message } => {
                tracing::warn!("Ignoring metadata in {}: {}", path.display(), message);
                (Attributes::new(), None)
            }
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Metadata::Parsed(_))
    }
}

/// Read and parse a markdown file with optional frontmatter.
pub async fn read_markdown(path: &Path) -> Metadata {
    let source = match tokio::fs::read_to_string(path).await {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Metadata::Absent,
        Err(e) => {
            return Metadata::Invalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    };

    match parse_document(&source) {
        Ok(document) => Metadata::Parsed(document),
        Err(e) => Metadata::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    }
}
