//! Create pages.

use std::path::Path;

use anyhow::{bail, Result};
use stylebook_core::util::{page_id_to_file_path, page_id_to_title};

use super::{report_created, write_file};
use crate::config::load_config;

/// Run the page command, creating a `page.md` for each id.
pub async fn run(config_path: &Path, ids: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(pages) = &config.source.pages else {
        bail!("No pages directory configured in {}", config_path.display());
    };

    let mut created = Vec::new();
    for id in ids {
        let id = id.trim_matches('/');
        if id.is_empty() {
            continue;
        }

        let path = page_id_to_file_path(pages, id);
        let title = page_id_to_title(id);
        let contents = format!("---\ntitle: {}\n---\n\n# {}\n", title, title);
        if write_file(&path, &contents, false).await? {
            created.push(path);
        }
    }

    tracing::info!("Pages created");
    report_created(&config.source.base, &created);

    Ok(())
}
