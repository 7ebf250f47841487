//! One-shot execution of user-data scripts as transient units

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::{JobMode, ManagerError, TransientProperties, UnitControl};

pub const SCRIPT_INTERPRETER: &str = "/bin/bash";

const SCRIPT_DESCRIPTION: &str = "Unit generated and executed by unitwatch on behalf of user";

/// Write `script` to a fresh file under `<workspace>/scripts`
pub fn stage_script(workspace: &Path, script: &str) -> Result<PathBuf, ManagerError> {
    let dir = workspace.join("scripts");
    fs::create_dir_all(&dir).map_err(|e| ManagerError::io(&dir, e))?;

    let mut file = tempfile::Builder::new()
        .prefix("script-")
        .tempfile_in(&dir)
        .map_err(|e| ManagerError::io(&dir, e))?;
    file.write_all(script.as_bytes())
        .map_err(|e| ManagerError::io(file.path(), e))?;

    let (_, path) = file.keep().map_err(|e| ManagerError::io(&dir, e.error))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .map_err(|e| ManagerError::io(&path, e))?;

    Ok(path)
}

/// Run `script_path` once in a transient unit and return the unit's name
pub async fn execute_script<C: UnitControl>(
    control: &C,
    script_path: &Path,
) -> Result<String, ManagerError> {
    let base = script_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("unitwatch-{}.service", base);

    let props = TransientProperties::new(
        SCRIPT_DESCRIPTION,
        vec![
            SCRIPT_INTERPRETER.to_string(),
            script_path.to_string_lossy().into_owned(),
        ],
    );

    log::info!("Creating transient systemd unit '{}'", name);
    control
        .start_transient_unit(&name, JobMode::Replace, &props)
        .await?;
    Ok(name)
}
