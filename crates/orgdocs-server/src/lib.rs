//! Development server with live reload for the OrgBot manual.
//!
//! Builds the site into a scratch directory, serves it under its base URL,
//! and rebuilds whenever the configuration, sidebar or docs change.

pub mod reload;
pub mod server;
pub mod site;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use site::static_site;
pub use watcher::{FileWatcher, WatchEvent};
