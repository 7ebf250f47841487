//! inotify event source
//!
//! Watches directories and forwards their events as `WatchEvent`s.

use futures_lite::StreamExt;
use inotify::{EventMask, EventStream, Inotify, WatchDescriptor, WatchMask};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::{ChangeEvent, ChangeKind, WatchError, WatchEvent};

const EVENT_BUFFER_SIZE: usize = 4096;

impl ChangeKind {
    pub fn from_mask(mask: EventMask) -> Self {
        if mask.intersects(EventMask::CREATE | EventMask::MOVED_TO) {
            ChangeKind::Created
        } else if mask.intersects(EventMask::MODIFY | EventMask::CLOSE_WRITE) {
            ChangeKind::Modified
        } else if mask.intersects(EventMask::DELETE | EventMask::MOVED_FROM) {
            ChangeKind::Removed
        } else {
            ChangeKind::Other
        }
    }
}

/// Watch `dirs` and return the receiving end of the event channel
///
/// A directory that cannot be watched is logged and skipped. The forwarding
/// task stops after delivering the first stream error.
pub fn spawn_watcher(dirs: &[PathBuf]) -> Result<mpsc::UnboundedReceiver<WatchEvent>, WatchError> {
    let inotify = Inotify::init().map_err(WatchError::Init)?;

    let mask = WatchMask::CREATE
        | WatchMask::MOVED_TO
        | WatchMask::MODIFY
        | WatchMask::DELETE
        | WatchMask::MOVED_FROM;

    let mut dirs_by_wd = HashMap::new();
    for dir in dirs {
        match inotify.watches().add(dir, mask) {
            Ok(wd) => {
                log::info!("Watching {}", dir.display());
                dirs_by_wd.insert(wd, dir.clone());
            }
            Err(e) => {
                log::warn!(
                    "Error setting up watch on {} (directory doesn't exist?): {}",
                    dir.display(),
                    e
                );
            }
        }
    }

    let stream = inotify
        .into_event_stream([0u8; EVENT_BUFFER_SIZE])
        .map_err(WatchError::Init)?;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(forward_events(stream, dirs_by_wd, tx));
    Ok(rx)
}

async fn forward_events(
    mut stream: EventStream<[u8; EVENT_BUFFER_SIZE]>,
    dirs: HashMap<WatchDescriptor, PathBuf>,
    tx: mpsc::UnboundedSender<WatchEvent>,
) {
    while let Some(item) = stream.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                let _ = tx.send(WatchEvent::Error(e));
                return;
            }
        };

        if event.mask.contains(EventMask::Q_OVERFLOW) {
            let _ = tx.send(WatchEvent::Error(io::Error::other(
                "inotify event queue overflowed",
            )));
            return;
        }

        let Some(dir) = dirs.get(&event.wd) else {
            continue;
        };

        if event.mask.contains(EventMask::IGNORED) {
            log::warn!("Watch on {} was removed", dir.display());
            continue;
        }

        // Events about the directory itself carry no name
        let Some(name) = event.name else {
            continue;
        };

        let change = ChangeEvent {
            path: dir.join(name),
            kind: ChangeKind::from_mask(event.mask),
        };
        if tx.send(WatchEvent::Change(change)).is_err() {
            log::debug!("Event consumer gone, stopping watcher");
            return;
        }
    }

    let _ = tx.send(WatchEvent::Error(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "inotify event stream ended",
    )));
}
