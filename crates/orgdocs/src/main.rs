//! orgdocs CLI - builds the StarCitizen OrgBot manual.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "orgdocs")]
#[command(about = "Build, check and preview the StarCitizen OrgBot manual")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the site config file
    #[arg(short, long, default_value = "orgdocs.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a site config, sidebar and first doc
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate the configuration and check every link without writing output
    Check,

    /// Build the static site
    Build {
        /// Output directory
        #[arg(short, long, default_value = "build")]
        out_dir: PathBuf,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,

        /// Only build these locales (repeatable)
        #[arg(short, long)]
        locale: Vec<String>,
    },

    /// Preview a built site under its base URL
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "build")]
        dir: PathBuf,
    },

    /// Start the development server with live reload
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Check => {
            commands::check::run(&cli.config).await?;
        }
        Commands::Build {
            out_dir,
            no_minify,
            locale,
        } => {
            let locales = (!locale.is_empty()).then_some(locale);
            commands::build::run(&cli.config, out_dir, !no_minify, locales).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(&cli.config, port, dir).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(cli.config, port, !no_open).await?;
        }
    }

    Ok(())
}
