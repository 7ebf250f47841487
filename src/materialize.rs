//! Hand a synthesized document to a separate deployment run
//!
//! The document is written to a scratch file and `unitwatch-deploy
//! --from-file <file>` is started as a transient unit, so placement and
//! restarts happen outside the watcher process and are serialized by the
//! manager's job queue.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::manager::{JobMode, ManagerError, TransientProperties, UnitControl};
use crate::units::{Document, DocumentError};

pub const DEFAULT_DEPLOY_BIN: &str = "/usr/bin/unitwatch-deploy";

const TEMP_PREFIX: &str = "unitwatch-";
const DEPLOY_DESCRIPTION: &str = "Unit generated and executed by unitwatch on behalf of user";

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("Failed to write document to {path}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

pub struct Materializer<C> {
    control: C,
    deploy_bin: PathBuf,
    temp_dir: PathBuf,
}

impl<C: UnitControl> Materializer<C> {
    pub fn new(control: C, deploy_bin: impl Into<PathBuf>) -> Self {
        Self {
            control,
            deploy_bin: deploy_bin.into(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Write scratch files somewhere other than the system temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Write `document` out and start the deployment unit for it
    ///
    /// Returns the transient unit name. The scratch file is left in place
    /// for the deployment run, or removed if the unit could not be started.
    pub async fn materialize(&self, document: &Document) -> Result<String, MaterializeError> {
        let body = document.to_yaml()?;
        let path = self.write_scratch(&body)?;
        log::info!("Wrote {} unit(s) to {}", document.len(), path.display());

        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{}.service", base);

        let props = TransientProperties::new(
            DEPLOY_DESCRIPTION,
            vec![
                self.deploy_bin.to_string_lossy().into_owned(),
                "--from-file".to_string(),
                path.to_string_lossy().into_owned(),
            ],
        );

        log::info!("Creating transient systemd unit '{}'", name);
        if let Err(e) = self
            .control
            .start_transient_unit(&name, JobMode::Replace, &props)
            .await
        {
            if let Err(rm) = std::fs::remove_file(&path) {
                log::warn!("Failed to remove {}: {}", path.display(), rm);
            }
            return Err(e.into());
        }
        Ok(name)
    }

    fn write_scratch(&self, body: &str) -> Result<PathBuf, MaterializeError> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| temp_error(&self.temp_dir, e))?;
        file.write_all(body.as_bytes())
            .map_err(|e| temp_error(file.path(), e))?;
        file.flush().map_err(|e| temp_error(file.path(), e))?;

        let (_, path) = file
            .keep()
            .map_err(|e| temp_error(&self.temp_dir, e.error))?;
        Ok(path)
    }
}

fn temp_error(path: &Path, source: std::io::Error) -> MaterializeError {
    MaterializeError::TempFile {
        path: path.to_path_buf(),
        source,
    }
}
