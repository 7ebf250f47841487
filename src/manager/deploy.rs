//! Full deployment of a document: place, enable, reload, activate

use std::path::Path;

use super::{activate, ManagerError, UnitControl};
use crate::units::{place_unit, Document};

pub async fn deploy<C: UnitControl>(
    control: &C,
    document: &Document,
    root: &Path,
) -> Result<(), ManagerError> {
    if document.is_empty() {
        log::info!("No units to deploy");
        return Ok(());
    }

    for unit in &document.units {
        let dst = place_unit(unit, root)?;
        log::info!("Wrote unit {} to {}", unit.name, dst.display());

        if unit.enable {
            log::info!("Enabling unit file {}", dst.display());
            control
                .enable_unit_files(&[dst], unit.is_runtime(), true)
                .await?;
        }
    }

    control.daemon_reload().await?;
    activate(control, &document.units).await
}
