//! Development server command.

use std::path::PathBuf;

use anyhow::Result;
use orgdocs_server::{DevServer, DevServerConfig};

/// Run the dev server.
pub async fn run(config_path: PathBuf, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        config_path,
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
