//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orgdocs_config::LoadedConfig;
use orgdocs_server::static_site;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: PathBuf) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'orgdocs build' first.",
            dir.display()
        );
    }

    let config = LoadedConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let base_url = config.routes().site_base_url().to_string();

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let url = format!("http://{}{}", addr, base_url);
    tracing::info!("Serving {} at {}", dir.display(), url);

    let app = static_site(dir, &base_url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Open browser
    if let Err(e) = open::that(&url) {
        tracing::debug!("Could not open browser: {}", e);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
