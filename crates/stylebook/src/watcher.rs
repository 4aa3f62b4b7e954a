//! File watching for rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File was created or modified
    Changed(PathBuf),

    /// File was deleted
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Removed(path) => path,
        }
    }
}

/// Watches the source directories of a project.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Missing paths are skipped. Events under `ignore` (the output
    /// directory) are dropped so a build never triggers itself.
    pub fn new(
        paths: &[PathBuf],
        ignore: Option<PathBuf>,
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
                tracing::debug!("Watching {}", path.display());
            }
        }

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;

            while let Ok(event) = sync_rx.recv() {
                let now = Instant::now();
                if last_event_time.is_some_and(|last| now.duration_since(last) < DEBOUNCE) {
                    continue;
                }

                let events: Vec<_> = event
                    .paths
                    .iter()
                    .filter(|path| !ignore.as_ref().is_some_and(|dir| path.starts_with(dir)))
                    .filter_map(|path| classify_event(path, &event.kind))
                    .collect();
                if events.is_empty() {
                    continue;
                }
                last_event_time = Some(now);

                for watch_event in events {
                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Changed(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
        _ => None,
    }
}
