//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;

use orgdocs_config::{ConfigError, LoadedConfig, CONFIG_FILENAME};
use orgdocs_static::{BuildOptions, StaticBuilder};

use crate::reload::{reload_client_script, ReloadHub, ReloadMessage, RELOAD_PATH};
use crate::site::static_site;
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site configuration file
    pub config_path: PathBuf,

    /// Scratch directory the site is built into
    pub output_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILENAME),
            output_dir: std::env::temp_dir().join("orgdocs-dev"),
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    config_path: PathBuf,
    output_dir: PathBuf,
    hub: ReloadHub,
    /// Message of the last failed build, cleared by a good one
    last_error: RwLock<Option<String>>,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, serve it, and rebuild on every change until stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        // The initial config must be valid; later mistakes are reported to the browser
        let loaded = LoadedConfig::load(&self.config.config_path)?;
        let base_url = loaded.routes().site_base_url().to_string();
        let watch_paths = loaded.watch_paths();

        let state = Arc::new(ServerState {
            config_path: self.config.config_path.clone(),
            output_dir: self.config.output_dir.clone(),
            hub: ReloadHub::new(),
            last_error: RwLock::new(None),
        });

        rebuild(&state, Some(loaded)).await;

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route(RELOAD_PATH, get(ws_handler))
            .with_state(Arc::clone(&state))
            .merge(static_site(self.config.output_dir.clone(), &base_url));

        let url = format!("http://{}{}", addr, base_url);
        tracing::info!("Dev server running at {}", url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build options used by the dev server.
fn dev_build_options(output_dir: PathBuf) -> BuildOptions {
    BuildOptions {
        output_dir,
        minify: false,
        include_drafts: true,
        scripts: vec![reload_client_script()],
        ..Default::default()
    }
}

/// Rebuild the site and tell connected browsers how it went.
///
/// `loaded` skips reloading the configuration when it is already at hand.
async fn rebuild(state: &ServerState, loaded: Option<LoadedConfig>) {
    let loaded = match loaded {
        Some(loaded) => Ok(loaded),
        None => LoadedConfig::load(&state.config_path),
    };

    let result = match loaded {
        Ok(config) => StaticBuilder::new(config, dev_build_options(state.output_dir.clone()))
            .build()
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(result) => {
            tracing::info!(
                "Built {} pages in {}ms",
                result.pages,
                result.duration_ms
            );
            *state.last_error.write().await = None;
            state.hub.send(ReloadMessage::Reload);
        }
        Err(message) => {
            tracing::error!("Build failed: {}", message);
            *state.last_error.write().await = Some(message.clone());
            state.hub.send(ReloadMessage::BuildError { message });
        }
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &ServerState, event: WatchEvent) {
    match &event {
        WatchEvent::DocsChanged(paths) => {
            for path in paths {
                tracing::info!("Doc changed: {}", path.display());
            }
        }
        WatchEvent::Changed(paths) => {
            for path in paths {
                tracing::info!("Changed: {}", path.display());
            }
        }
    }

    rebuild(state, None).await;
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    let mut greeting = vec![ReloadMessage::Connected];
    if let Some(message) = state.last_error.read().await.clone() {
        greeting.push(ReloadMessage::BuildError { message });
    }
    for msg in greeting {
        if !send(&mut socket, &msg).await {
            return;
        }
    }

    // Forward reload messages to the client
    while let Ok(msg) = rx.recv().await {
        if !send(&mut socket, &msg).await {
            break;
        }
    }
}

/// Send a message; `false` once the client is gone.
async fn send(socket: &mut WebSocket, msg: &ReloadMessage) -> bool {
    let Ok(json) = serde_json::to_string(msg) else {
        return false;
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 3000);
        assert_eq!(server.config.config_path, PathBuf::from("orgdocs.toml"));
    }

    #[test]
    fn dev_builds_include_drafts_and_reload_script() {
        let options = dev_build_options(PathBuf::from("/tmp/site"));

        assert!(options.include_drafts);
        assert!(!options.minify);
        assert_eq!(options.scripts.len(), 1);
        assert!(options.scripts[0].contains(RELOAD_PATH));
    }

    #[tokio::test]
    async fn failed_rebuild_is_broadcast() {
        let temp = tempdir().unwrap();
        let state = ServerState {
            config_path: temp.path().join("orgdocs.toml"),
            output_dir: temp.path().join("build"),
            hub: ReloadHub::new(),
            last_error: RwLock::new(None),
        };
        let mut rx = state.hub.subscribe();

        rebuild(&state, None).await;

        match rx.try_recv() {
            Ok(ReloadMessage::BuildError { message }) => {
                assert!(message.contains("orgdocs.toml"), "{}", message);
            }
            other => panic!("Expected BuildError, got {:?}", other),
        }
        assert!(state.last_error.read().await.is_some());
    }

    #[tokio::test]
    async fn successful_rebuild_reloads_clients() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(
            root.join("orgdocs.toml"),
            r#"
title = "Manual"
url = "https://example.github.io"

[[presets]]
name = "classic"
docs = { sidebar_path = "sidebars.toml", route_base_path = "/" }
"#,
        )
        .unwrap();
        fs::write(root.join("sidebars.toml"), r#"tutorialSidebar = ["intro"]"#).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/intro.md"), "---\nslug: /\n---\n# Intro\n").unwrap();

        let state = ServerState {
            config_path: root.join("orgdocs.toml"),
            output_dir: root.join("build"),
            hub: ReloadHub::new(),
            last_error: RwLock::new(Some("old failure".to_string())),
        };
        let mut rx = state.hub.subscribe();

        rebuild(&state, None).await;

        assert_eq!(rx.try_recv().ok(), Some(ReloadMessage::Reload));
        assert!(state.last_error.read().await.is_none());
        let html = fs::read_to_string(root.join("build/index.html")).unwrap();
        assert!(html.contains("__reload"));
    }
}
