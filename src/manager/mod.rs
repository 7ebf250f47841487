//! Unit deployment against the service manager
//!
//! `UnitControl` is the control surface the rest of the crate talks to.
//! The production implementation is [`crate::dbus::SystemdClient`]; tests
//! substitute a recorder.

mod activate;
mod deploy;
mod script;

pub use activate::{activate, split_network_units, NETWORKD_SERVICE};
pub use deploy::deploy;
pub use script::{execute_script, stage_script, SCRIPT_INTERPRETER};

use std::path::{Path, PathBuf};

use crate::units::PlaceError;

/// How the manager should queue a job relative to existing ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobMode {
    #[default]
    Replace,
    Fail,
    Isolate,
    IgnoreDependencies,
    IgnoreRequirements,
}

impl JobMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobMode::Replace => "replace",
            JobMode::Fail => "fail",
            JobMode::Isolate => "isolate",
            JobMode::IgnoreDependencies => "ignore-dependencies",
            JobMode::IgnoreRequirements => "ignore-requirements",
        }
    }
}

impl std::fmt::Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory definition of a transient service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientProperties {
    pub description: String,
    /// argv; the first element is the program
    pub exec_start: Vec<String>,
    /// Ignore a failing exit status (the `-` prefix in unit files)
    pub ignore_failure: bool,
}

impl TransientProperties {
    pub fn new(description: impl Into<String>, exec_start: Vec<String>) -> Self {
        Self {
            description: description.into(),
            exec_start,
            ignore_failure: false,
        }
    }

    pub fn program(&self) -> Option<&str> {
        self.exec_start.first().map(String::as_str)
    }
}

/// Operations the deployment engine needs from the service manager
///
/// Every call returns once the manager has accepted the request. None of
/// them wait for the unit to reach a terminal state.
#[allow(async_fn_in_trait)]
pub trait UnitControl {
    /// Mark unit files enabled; `runtime` targets the run/ tree, `force`
    /// replaces conflicting symlinks
    async fn enable_unit_files(
        &self,
        files: &[PathBuf],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError>;

    /// Re-scan unit definitions (daemon-reload)
    async fn daemon_reload(&self) -> Result<(), ManagerError>;

    /// Queue a restart in replace mode
    async fn restart_unit(&self, name: &str) -> Result<(), ManagerError>;

    /// Queue a start in replace mode
    async fn start_unit(&self, name: &str) -> Result<(), ManagerError>;

    /// Create an unpersisted unit from `properties` and start it
    async fn start_transient_unit(
        &self,
        name: &str,
        mode: JobMode,
        properties: &TransientProperties,
    ) -> Result<(), ManagerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Failed to connect to the service manager: {0}")]
    Connect(#[source] zbus::Error),

    #[error("{operation} failed for {target}: {source}")]
    Call {
        operation: &'static str,
        target: String,
        #[source]
        source: zbus::Error,
    },

    #[error("Invalid transient unit {0}: empty ExecStart")]
    EmptyCommand(String),

    #[error(transparent)]
    Place(#[from] PlaceError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManagerError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ManagerError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
