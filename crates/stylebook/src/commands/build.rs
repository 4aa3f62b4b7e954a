//! Build command and watch loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use stylebook_adapters::AdapterRegistry;
use stylebook_core::{Config, Connector, Resolver, State};
use stylebook_static::{BuildResult, SiteBuilder};

use crate::config::{load_config, timestamp};
use crate::watcher::FileWatcher;

/// Command line overrides for the configuration.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub output: Option<PathBuf>,
    pub debug: bool,
    pub minify: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output: None,
            debug: false,
            minify: true,
        }
    }
}

/// A configured project ready to be built repeatedly.
struct Project {
    config: Config,
    connector: Arc<Connector>,
    builder: SiteBuilder,
}

impl Project {
    fn load(config_path: &Path, options: &BuildOptions) -> Result<Self> {
        let mut config = load_config(config_path)?;

        if let Some(output) = &options.output {
            config.target = if output.is_relative() {
                std::env::current_dir()
                    .context("Failed to read the current directory")?
                    .join(output)
            } else {
                output.clone()
            };
        }
        config.debug |= options.debug;

        let connector = Connector::setup(&config, &AdapterRegistry::with_builtins())
            .context("Failed to set up adapters")?;
        let connector = Arc::new(connector);
        let builder = SiteBuilder::new(Arc::clone(&connector))?.with_minify(options.minify);

        Ok(Self {
            config,
            connector,
            builder,
        })
    }

    async fn resolve(&self) -> Result<State> {
        let resolver = Resolver::from_shared(
            Arc::new(self.config.clone()),
            Arc::clone(&self.connector),
        );

        State::resolve(&resolver)
            .await
            .context("Failed to resolve the project")
    }

    async fn build(&self) -> Result<BuildResult> {
        let state = self.resolve().await?;
        let result = self.builder.generate(&state).await?;
        Ok(result)
    }

    /// Re-resolve and regenerate without clearing the target.
    async fn rebuild(&mut self) -> Result<BuildResult> {
        self.config.update = timestamp();
        let state = self.resolve().await?;
        let result = self.builder.generate_increment(&state).await?;
        Ok(result)
    }

    /// Source directories worth watching.
    fn watch_paths(&self) -> Vec<PathBuf> {
        let source = &self.config.source;
        [
            &source.components,
            &source.templates,
            &source.pages,
            &source.entities,
            &source.data,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

fn report(result: &BuildResult) {
    tracing::info!(
        "Build done: {} pages and {} variants in {}ms",
        result.pages,
        result.variants,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());
}

/// Run a full build.
pub async fn run(config_path: &Path, options: &BuildOptions) -> Result<BuildResult> {
    tracing::info!("Building style guide...");

    let project = Project::load(config_path, options)?;
    let result = project.build().await?;
    report(&result);

    Ok(result)
}

/// Run a full build, then rebuild whenever a source file changes.
///
/// Failed rebuilds are logged and the loop keeps watching.
pub async fn watch(config_path: &Path, options: BuildOptions) -> Result<()> {
    let mut project = Project::load(config_path, &options)?;
    report(&project.build().await?);

    let (_watcher, mut rx) =
        FileWatcher::new(&project.watch_paths(), Some(project.config.target.clone()))
            .context("Failed to start the file watcher")?;

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(event) = rx.recv().await {
        // One rebuild covers everything queued so far.
        while rx.try_recv().is_ok() {}

        tracing::info!("{} changed, rebuilding...", event.path().display());
        match project.rebuild().await {
            Ok(result) => report(&result),
            Err(e) => tracing::error!("Rebuild failed: {:#}", e),
        }
    }

    Ok(())
}
