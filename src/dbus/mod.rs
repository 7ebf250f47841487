//! D-Bus client for the systemd manager
//!
//! Talks to org.freedesktop.systemd1 on the system bus. Every operation
//! opens its own connection and drops it when done, so a manager restart
//! between calls only affects the call in flight.

mod manager;
mod properties;

pub use manager::SystemdManagerProxy;
pub use properties::transient_properties;

use std::path::PathBuf;
use zbus::Connection;

use crate::manager::{JobMode, ManagerError, TransientProperties, UnitControl};

/// `UnitControl` backed by the real systemd manager
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemdClient;

impl SystemdClient {
    pub fn new() -> Self {
        Self
    }

    async fn connect() -> Result<Connection, ManagerError> {
        Connection::system().await.map_err(ManagerError::Connect)
    }
}

fn call_error(
    operation: &'static str,
    target: impl Into<String>,
) -> impl FnOnce(zbus::Error) -> ManagerError {
    let target = target.into();
    move |source| ManagerError::Call {
        operation,
        target,
        source,
    }
}

impl UnitControl for SystemdClient {
    async fn enable_unit_files(
        &self,
        files: &[PathBuf],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError> {
        let paths: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let args: Vec<&str> = paths.iter().map(String::as_str).collect();

        let conn = Self::connect().await?;
        let proxy = SystemdManagerProxy::new(&conn)
            .await
            .map_err(ManagerError::Connect)?;
        let (carries_install_info, changes) = proxy
            .enable_unit_files(&args, runtime, force)
            .await
            .map_err(call_error("EnableUnitFiles", paths.join(" ")))?;

        log::debug!(
            "EnableUnitFiles: install_info={} changes={}",
            carries_install_info,
            changes.len()
        );
        for (kind, link, dest) in changes {
            log::info!("{} {} -> {}", kind, link, dest);
        }
        Ok(())
    }

    async fn daemon_reload(&self) -> Result<(), ManagerError> {
        let conn = Self::connect().await?;
        let proxy = SystemdManagerProxy::new(&conn)
            .await
            .map_err(ManagerError::Connect)?;
        proxy
            .reload()
            .await
            .map_err(call_error("Reload", "manager"))
    }

    async fn restart_unit(&self, name: &str) -> Result<(), ManagerError> {
        log::info!("Restarting unit {}", name);
        let conn = Self::connect().await?;
        let proxy = SystemdManagerProxy::new(&conn)
            .await
            .map_err(ManagerError::Connect)?;
        let job = proxy
            .restart_unit(name, JobMode::Replace.as_str())
            .await
            .map_err(call_error("RestartUnit", name))?;
        log::info!("Restart completed with '{}'", job.as_str());
        Ok(())
    }

    async fn start_unit(&self, name: &str) -> Result<(), ManagerError> {
        let conn = Self::connect().await?;
        let proxy = SystemdManagerProxy::new(&conn)
            .await
            .map_err(ManagerError::Connect)?;
        let job = proxy
            .start_unit(name, JobMode::Replace.as_str())
            .await
            .map_err(call_error("StartUnit", name))?;
        log::debug!("StartUnit {} queued as {}", name, job.as_str());
        Ok(())
    }

    async fn start_transient_unit(
        &self,
        name: &str,
        mode: JobMode,
        properties: &TransientProperties,
    ) -> Result<(), ManagerError> {
        let props = transient_properties(name, properties)?;

        let conn = Self::connect().await?;
        let proxy = SystemdManagerProxy::new(&conn)
            .await
            .map_err(ManagerError::Connect)?;
        let job = proxy
            .start_transient_unit(name, mode.as_str(), &props, &[])
            .await
            .map_err(call_error("StartTransientUnit", name))?;
        log::debug!("StartTransientUnit {} queued as {}", name, job.as_str());
        Ok(())
    }
}
