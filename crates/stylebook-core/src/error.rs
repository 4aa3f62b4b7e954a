use std::path::PathBuf;

use crate::connector::ConnectorError;

/// Errors that abort resolving the state.
///
/// Per-item problems (missing metadata, a variant failing to render) are
/// recovered where they happen and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("No {0} source directory configured")]
    MissingSource(&'static str),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("Resolve task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
