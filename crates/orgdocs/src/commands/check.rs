//! Configuration and link check command.

use std::path::Path;

use anyhow::{Context, Result};
use orgdocs_config::LoadedConfig;
use orgdocs_static::{BuildOptions, StaticBuilder};

/// Run the check command.
///
/// Loads and validates the configuration, then runs a build that resolves
/// every sidebar doc and link without writing anything.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = LoadedConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let sidebars = config.sidebars.sidebar_ids().count();

    let options = BuildOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = StaticBuilder::new(config, options).build().await?;

    tracing::info!(
        "{} is valid: {} sidebar(s), {} page(s), {} broken link(s) reported",
        config_path.display(),
        sidebars,
        result.pages,
        result.broken_links
    );

    Ok(())
}
