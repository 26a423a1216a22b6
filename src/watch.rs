//! Reload the source image when it changes on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::imaging::ImageError;

/// Extra reads after an empty one
pub const READ_RETRIES: u32 = 2;
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum WatchEvent {
    Reloaded { path: PathBuf, bytes: Vec<u8> },
    Failed { path: PathBuf, error: ImageError },
}

/// Read a file, retrying while it comes back empty
pub fn read_with_retries(
    path: &Path,
    retries: u32,
    delay: Duration,
    mut read: impl FnMut(&Path) -> std::io::Result<Vec<u8>>,
) -> Result<Vec<u8>, ImageError> {
    let attempts = retries + 1;
    for attempt in 1..=attempts {
        let bytes = read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if !bytes.is_empty() {
            return Ok(bytes);
        }
        if attempt < attempts {
            tracing::debug!(path = %path.display(), attempt, "read was empty, retrying");
            thread::sleep(delay);
        }
    }
    Err(ImageError::EmptyRead {
        path: path.to_path_buf(),
        attempts,
    })
}

/// Watches one file; changes arrive through `poll`
pub struct SourceWatcher {
    path: PathBuf,
    _watcher: Mutex<RecommendedWatcher>,
    rx: Receiver<WatchEvent>,
}

impl SourceWatcher {
    pub fn watch(path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = unbounded();
        let busy = Arc::new(AtomicBool::new(false));
        let watched = path.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("file watch error: {e}");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            // Skip events that arrive while a reload is still reading
            if busy.swap(true, Ordering::AcqRel) {
                return;
            }
            let message = match read_with_retries(&watched, READ_RETRIES, RETRY_DELAY, |p| fs::read(p)) {
                Ok(bytes) => WatchEvent::Reloaded {
                    path: watched.clone(),
                    bytes,
                },
                Err(error) => WatchEvent::Failed {
                    path: watched.clone(),
                    error,
                },
            };
            let _ = tx.send(message);
            busy.store(false, Ordering::Release);
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "watching source image");

        Ok(Self {
            path: path.to_path_buf(),
            _watcher: Mutex::new(watcher),
            rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest events; bursts collapse to the newest reload
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events: Vec<WatchEvent> = Vec::new();
        for event in self.rx.try_iter() {
            if matches!(event, WatchEvent::Reloaded { .. }) {
                events.retain(|e| !matches!(e, WatchEvent::Reloaded { .. }));
            }
            events.push(event);
        }
        events
    }
}
