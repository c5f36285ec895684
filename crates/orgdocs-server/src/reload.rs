//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live reload WebSocket endpoint.
pub const RELOAD_PATH: &str = "/__reload";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// A rebuild finished; reload the page
    Reload,

    /// A rebuild failed
    BuildError {
        /// Error message as printed by the build
        message: String,
    },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new reload hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side script appended to every page built by the dev server.
///
/// Connects to the reload endpoint on the page's own host, reloads on
/// `reload`, and shows build errors in an overlay until the next good build.
pub fn reload_client_script() -> String {
    format!(
        r#"(function() {{
  'use strict';

  var protocol = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var reconnectAttempts = 0;
  var maxReconnectAttempts = 10;

  function showError(message) {{
    var overlay = document.getElementById('orgdocs-build-error');
    if (!overlay) {{
      overlay = document.createElement('pre');
      overlay.id = 'orgdocs-build-error';
      overlay.style.cssText = 'position:fixed;inset:auto 1rem 1rem 1rem;z-index:1000;margin:0;padding:1rem;' +
        'background:#2d0b0b;color:#ffb4b4;border-radius:0.5rem;white-space:pre-wrap;max-height:50vh;overflow:auto;';
      document.body.appendChild(overlay);
    }}
    overlay.textContent = message;
  }}

  function connect() {{
    var ws = new WebSocket(protocol + location.host + '{path}');

    ws.onopen = function() {{
      console.log('[orgdocs] Connected');
      reconnectAttempts = 0;
    }};

    ws.onmessage = function(event) {{
      var msg = JSON.parse(event.data);
      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;
        case 'build_error':
          console.error('[orgdocs] Build failed:', msg.message);
          showError(msg.message);
          break;
        case 'connected':
          break;
      }}
    }};

    ws.onclose = function() {{
      if (reconnectAttempts < maxReconnectAttempts) {{
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }}
    }};
  }}

  connect();
}})();"#,
        path = RELOAD_PATH
    )
}
