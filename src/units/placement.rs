//! Writing unit files into the systemd search tree

use std::fs::{self, DirBuilder};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use super::Unit;

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    #[error("Invalid unit name: {0:?}")]
    InvalidName(String),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write unit file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory a unit belongs in, e.g. `<root>/run/systemd/network`
pub fn unit_dir(unit: &Unit, root: &Path) -> PathBuf {
    root.join(unit.persistence.base_dir())
        .join("systemd")
        .join(unit.group().as_str())
}

/// Write the unit under `root` and return the path written
///
/// Existing files are overwritten in place.
pub fn place_unit(unit: &Unit, root: &Path) -> Result<PathBuf, PlaceError> {
    if unit.name.is_empty() || unit.name.contains('/') || unit.name == "." || unit.name == ".." {
        return Err(PlaceError::InvalidName(unit.name.clone()));
    }

    let dir = unit_dir(unit, root);
    if !dir.is_dir() {
        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(&dir)
            .map_err(|e| PlaceError::CreateDir {
                path: dir.clone(),
                source: e,
            })?;
    }

    let dst = dir.join(&unit.name);
    write_unit_file(&dst, &unit.content).map_err(|e| PlaceError::Write {
        path: dst.clone(),
        source: e,
    })?;

    log::debug!("Placed {} at {}", unit.name, dst.display());
    Ok(dst)
}

fn write_unit_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)?;
    file.write_all(content.as_bytes())?;

    // mode() only applies on creation
    fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_test_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = PathBuf::from(format!("/tmp/unitwatch-place-{}-{}", std::process::id(), id));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_place_persisted_network_unit() {
        let root = unique_test_dir();
        let unit = Unit::new("50-eth0.network", "[Match]\nName=eth0\n");

        let dst = place_unit(&unit, &root).unwrap();

        assert_eq!(dst, root.join("etc/systemd/network/50-eth0.network"));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "[Match]\nName=eth0\n");
        assert_eq!(mode_of(&dst), 0o644);
        assert!(!root.join("run").exists());
    }

    #[test]
    fn test_place_runtime_system_unit() {
        let root = unique_test_dir();
        let unit = Unit::new("scratch.service", "[Service]\n").runtime();

        let dst = place_unit(&unit, &root).unwrap();

        assert_eq!(dst, root.join("run/systemd/system/scratch.service"));
        assert_eq!(mode_of(&root.join("run/systemd/system")), 0o755);
        assert!(!root.join("etc").exists());
    }

    #[test]
    fn test_place_overwrites() {
        let root = unique_test_dir();
        let dst = place_unit(&Unit::new("a.service", "old content\n"), &root).unwrap();
        fs::set_permissions(&dst, fs::Permissions::from_mode(0o600)).unwrap();

        place_unit(&Unit::new("a.service", "new\n"), &root).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "new\n");
        assert_eq!(mode_of(&dst), 0o644);
    }

    #[test]
    fn test_place_rejects_bad_names() {
        let root = unique_test_dir();
        for name in ["", ".", "..", "../escape.service", "a/b.service"] {
            let result = place_unit(&Unit::new(name, ""), &root);
            assert!(matches!(result, Err(PlaceError::InvalidName(_))), "{}", name);
        }
    }

    #[test]
    fn test_place_dir_error() {
        let root = unique_test_dir();
        // A file where the directory tree should go
        fs::write(root.join("etc"), "").unwrap();

        let result = place_unit(&Unit::new("a.service", ""), &root);
        assert!(matches!(result, Err(PlaceError::CreateDir { .. })));
    }
}
