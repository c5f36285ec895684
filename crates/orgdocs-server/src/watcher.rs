//! File watching for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that ends a burst of file system events.
const DEBOUNCE: Duration = Duration::from_millis(150);

/// A debounced batch of changes.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Only Markdown docs changed
    DocsChanged(Vec<PathBuf>),

    /// Configuration, sidebars, styles or static files changed
    Changed(Vec<PathBuf>),
}

impl WatchEvent {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::DocsChanged(paths) | Self::Changed(paths) => paths,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Paths that do not exist are skipped. Returns the watcher and a channel
    /// to receive debounced events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut changed = changed_paths(&first);

                // Collect the rest of the burst
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    for path in changed_paths(&event) {
                        if !changed.contains(&path) {
                            changed.push(path);
                        }
                    }
                }

                if let Some(event) = classify(changed) {
                    if async_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Paths touched by a notify event that should trigger a rebuild.
fn changed_paths(event: &notify::Event) -> Vec<PathBuf> {
    use notify::EventKind;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event
            .paths
            .iter()
            .filter(|p| !is_editor_temp(p))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Swap and backup files written by editors.
fn is_editor_temp(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with('~') || name.ends_with(".swp") || name.starts_with(".#")
}

fn classify(paths: Vec<PathBuf>) -> Option<WatchEvent> {
    if paths.is_empty() {
        return None;
    }

    let docs_only = paths.iter().all(|p| {
        matches!(
            p.extension().and_then(|e| e.to_str()),
            Some("md") | Some("mdx")
        )
    });

    Some(if docs_only {
        WatchEvent::DocsChanged(paths)
    } else {
        WatchEvent::Changed(paths)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_batches() {
        assert_eq!(classify(vec![]), None);
        assert_eq!(
            classify(vec![PathBuf::from("docs/intro.md")]),
            Some(WatchEvent::DocsChanged(vec![PathBuf::from("docs/intro.md")]))
        );
        assert!(matches!(
            classify(vec![
                PathBuf::from("docs/intro.md"),
                PathBuf::from("sidebars.toml")
            ]),
            Some(WatchEvent::Changed(_))
        ));
    }

    #[test]
    fn ignores_editor_temp_files() {
        assert!(is_editor_temp(Path::new("docs/.intro.md.swp")));
        assert!(is_editor_temp(Path::new("docs/intro.md~")));
        assert!(!is_editor_temp(Path::new("docs/intro.md")));
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let test_file = temp.path().join("intro.md");

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "# Created").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        // Keep watcher alive until we're done
        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert!(event.paths().iter().any(|p| p.ends_with("intro.md")));
    }
}
