//! Fixed table of watched paths and their handlers
//!
//! Keys are absolute paths as seen from inside the watched tree; the
//! on-disk location is the key re-rooted under the watch directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use crate::synth::Handler;

/// Gentoo network configuration
pub const NET_CONF_PATH: &str = "/etc/conf.d/net";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRegistry {
    entries: BTreeMap<PathBuf, Handler>,
}

impl WatchRegistry {
    /// The table the watcher ships with
    pub fn builtin() -> Self {
        Self::from_entries([(NET_CONF_PATH, Handler::GentooNet)])
    }

    /// Build a registry; relative keys are treated as rooted at `/`
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Handler)>,
        P: AsRef<Path>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, handler)| (Path::new("/").join(key), handler))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &Path) -> Option<Handler> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, Handler)> {
        self.entries.iter().map(|(k, h)| (k.as_path(), *h))
    }

    /// Where `key` lives under `root`
    pub fn watch_path(root: &Path, key: &Path) -> PathBuf {
        let relative: PathBuf = key
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        root.join(relative)
    }

    /// Inverse of `watch_path`: the registry key for a path under `root`
    pub fn key_for(root: &Path, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(root).ok()?;
        Some(Path::new("/").join(relative))
    }

    /// Every registered path, re-rooted under `root`
    pub fn watch_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .map(|key| Self::watch_path(root, key))
            .collect()
    }

    /// Parent directories to put watches on, without duplicates
    pub fn watch_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let dirs: BTreeSet<PathBuf> = self
            .watch_paths(root)
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();
        dirs.into_iter().collect()
    }
}
