//! Stylebook CLI - static style guide generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod watcher;

#[derive(Parser)]
#[command(name = "stylebook")]
#[command(about = "Static style guide generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the stylebook.toml config file
    #[arg(short, long, default_value = "stylebook.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file, the home page and the preview template
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the style guide
    Build {
        /// Output directory (defaults to the configured target)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the state dump and include render contexts in errors
        #[arg(short, long)]
        debug: bool,

        /// Rebuild when source files change
        #[arg(short, long)]
        watch: bool,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Scaffold a component with its variants
    Component {
        /// Component id (directory name)
        name: String,

        /// Variant names (defaults to "default")
        variants: Vec<String>,

        /// Adapter extension used for the scaffolded files
        #[arg(short, long)]
        ext: Option<String>,
    },

    /// Create pages
    Page {
        /// Page ids, nested ids separated by "/"
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build {
            output,
            debug,
            watch,
            no_minify,
        } => {
            let options = commands::build::BuildOptions {
                output,
                debug,
                minify: !no_minify,
            };
            if watch {
                commands::build::watch(&cli.config, options).await?;
            } else {
                commands::build::run(&cli.config, &options).await?;
            }
        }
        Commands::Component {
            name,
            variants,
            ext,
        } => {
            commands::component::run(&cli.config, &name, &variants, ext.as_deref()).await?;
        }
        Commands::Page { ids } => {
            commands::page::run(&cli.config, &ids).await?;
        }
    }

    Ok(())
}
