pub mod build;
pub mod component;
pub mod init;
pub mod page;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write a new file, creating parent directories.
///
/// Existing files are kept unless `overwrite` is set. Returns whether the
/// file was written.
pub(crate) async fn write_file(path: &Path, contents: &str, overwrite: bool) -> Result<bool> {
    if !overwrite && tokio::fs::try_exists(path).await.unwrap_or(false) {
        tracing::warn!("{} already exists, skipping", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(true)
}

/// Log the files a command created, relative to the project root.
pub(crate) fn report_created(root: &Path, created: &[PathBuf]) {
    if created.is_empty() {
        return;
    }

    tracing::info!("The following files were created:");
    for path in created {
        let relative = path.strip_prefix(root).unwrap_or(path);
        tracing::info!("  {}", relative.display());
    }
}
