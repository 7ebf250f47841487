//! Path-change dispatcher
//!
//! Resolves changed files to their registered handler, synthesizes a
//! document and hands it to the materializer.
//!
//! ```text
//!  inotify ──▶ watcher task ──mpsc──▶ Dispatcher::run ──▶ Synthesizer
//!                                          │                  │
//!                                          │               Document
//!                                          ▼                  │
//!                                     WatchError ◀── fatal    ▼
//!                                                       Materializer
//! ```
//!
//! Events are handled one at a time in arrival order. Handler failures are
//! logged and the loop continues; an error from the watch channel itself
//! ends the loop.

mod registry;
mod watcher;

pub use registry::{WatchRegistry, NET_CONF_PATH};
pub use watcher::spawn_watcher;

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::manager::UnitControl;
use crate::materialize::{MaterializeError, Materializer};
use crate::synth::{SynthError, Synthesizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Created in place or renamed into the directory
    Created,
    Modified,
    Removed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug)]
pub enum WatchEvent {
    Change(ChangeEvent),
    Error(std::io::Error),
}

impl WatchEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        WatchEvent::Change(ChangeEvent {
            path: path.into(),
            kind: ChangeKind::Created,
        })
    }
}

/// Fatal conditions of the watch mechanism
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to set up inotify: {0}")]
    Init(#[source] std::io::Error),

    #[error("Watch error: {0}")]
    Channel(#[source] std::io::Error),

    #[error("Watch channel closed")]
    Closed,
}

/// Per-event failures; logged, never fatal
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No handler registered for {0}")]
    NoHandler(PathBuf),

    #[error("{0} does not exist")]
    Missing(PathBuf),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

pub struct Dispatcher<C> {
    root: PathBuf,
    registry: WatchRegistry,
    synthesizer: Synthesizer,
    materializer: Materializer<C>,
}

impl<C: UnitControl> Dispatcher<C> {
    pub fn new(
        root: impl Into<PathBuf>,
        registry: WatchRegistry,
        synthesizer: Synthesizer,
        materializer: Materializer<C>,
    ) -> Self {
        Self {
            root: root.into(),
            registry,
            synthesizer,
            materializer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn materializer(&self) -> &Materializer<C> {
        &self.materializer
    }

    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        self.registry.watch_dirs(&self.root)
    }

    /// Run every handler whose file already exists
    ///
    /// Returns how many handlers completed successfully.
    pub async fn bootstrap(&self) -> usize {
        let mut handled = 0;
        for path in self.registry.watch_paths(&self.root) {
            if !path.exists() {
                log::debug!("{} not present at startup, waiting for it", path.display());
                continue;
            }
            match self.dispatch(&path).await {
                Ok(unit) => {
                    log::info!("Initial run for {} started {}", path.display(), unit);
                    handled += 1;
                }
                Err(e) => log::warn!("Initializing event for {} failed: {}", path.display(), e),
            }
        }
        handled
    }

    /// Resolve `path` to its handler, synthesize, and materialize
    ///
    /// Returns the name of the transient deployment unit.
    pub async fn dispatch(&self, path: &Path) -> Result<String, DispatchError> {
        let handler = WatchRegistry::key_for(&self.root, path)
            .and_then(|key| self.registry.get(&key))
            .ok_or_else(|| DispatchError::NoHandler(path.to_path_buf()))?;

        if !path.exists() {
            return Err(DispatchError::Missing(path.to_path_buf()));
        }

        log::info!("Running {} handler for {}", handler.name(), path.display());
        let document = self.synthesizer.run(handler, path).await?;
        Ok(self.materializer.materialize(&document).await?)
    }

    /// Consume events until the channel reports an error or closes
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<WatchEvent>) -> WatchError {
        while let Some(event) = events.recv().await {
            match event {
                WatchEvent::Change(change) => self.on_change(change).await,
                WatchEvent::Error(e) => {
                    log::error!("Watch error: {}", e);
                    return WatchError::Channel(e);
                }
            }
        }
        WatchError::Closed
    }

    async fn on_change(&self, change: ChangeEvent) {
        log::debug!("Got event {:?} for {}", change.kind, change.path.display());
        if change.kind != ChangeKind::Created {
            return;
        }

        match self.dispatch(&change.path).await {
            Ok(unit) => log::info!("Handled {} via {}", change.path.display(), unit),
            Err(DispatchError::NoHandler(path)) => {
                log::debug!("Ignoring {}: no handler registered", path.display());
            }
            Err(e) => log::error!("Error handling event for {}: {}", change.path.display(), e),
        }
    }
}
