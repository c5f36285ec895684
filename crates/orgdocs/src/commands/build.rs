//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orgdocs_config::LoadedConfig;
use orgdocs_static::{BuildOptions, StaticBuilder};

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output_dir: PathBuf,
    minify: bool,
    locales: Option<Vec<String>>,
) -> Result<()> {
    tracing::info!("Building static site...");

    let config = LoadedConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let options = BuildOptions {
        output_dir,
        minify,
        locales,
        ..Default::default()
    };

    let result = StaticBuilder::new(config, options).build().await?;

    tracing::info!(
        "Built {} pages for {} in {}ms",
        result.pages,
        result.locales.join(", "),
        result.duration_ms
    );
    if result.broken_links > 0 {
        tracing::warn!("{} broken link(s) reported", result.broken_links);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
