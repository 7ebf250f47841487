//! Unit descriptor and its derived classification

use serde::{Deserialize, Serialize};

/// Unit kinds that are consumed by systemd-networkd rather than started on their own
const NETWORK_KINDS: [&str; 3] = ["network", "netdev", "link"];

/// Where a unit file lives once placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Durable, under etc/systemd
    #[default]
    Persisted,
    /// Cleared on reboot, under run/systemd
    Runtime,
}

impl Persistence {
    pub fn is_runtime(&self) -> bool {
        matches!(self, Persistence::Runtime)
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Persistence::Persisted)
    }

    /// Top-level directory under the root prefix ("etc" or "run")
    pub fn base_dir(&self) -> &'static str {
        match self {
            Persistence::Persisted => "etc",
            Persistence::Runtime => "run",
        }
    }
}

/// Coarse classification deciding both placement and activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    Network,
    System,
}

impl UnitGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitGroup::Network => "network",
            UnitGroup::System => "system",
        }
    }
}

impl std::fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named unit file with its raw content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,

    #[serde(default, skip_serializing_if = "Persistence::is_persisted")]
    pub persistence: Persistence,

    /// Request `EnableUnitFiles` for the placed file
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable: bool,

    #[serde(default)]
    pub content: String,
}

impl Unit {
    /// Create a persisted, non-enabled unit
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistence: Persistence::Persisted,
            enable: false,
            content: content.into(),
        }
    }

    pub fn runtime(mut self) -> Self {
        self.persistence = Persistence::Runtime;
        self
    }

    pub fn enabled(mut self) -> Self {
        self.enable = true;
        self
    }

    pub fn is_runtime(&self) -> bool {
        self.persistence.is_runtime()
    }

    /// Lowercase extension of the name without the dot, empty if there is none
    pub fn kind(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        }
    }

    /// Always recomputed from the name
    pub fn group(&self) -> UnitGroup {
        let kind = self.kind();
        if NETWORK_KINDS.contains(&kind.as_str()) {
            UnitGroup::Network
        } else {
            UnitGroup::System
        }
    }
}
