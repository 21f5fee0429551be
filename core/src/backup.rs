use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{RestoreError, SolverError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// There was no `.bak` file, nothing was touched.
    NoBackup,
    Restored,
}

/// `<path>.bak`, with the suffix appended to the full file name.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy `path` byte for byte to `<path>.bak`, replacing any earlier backup.
///
/// A half-written backup is left behind if the copy fails partway.
pub fn create_backup(path: &Path) -> Result<PathBuf, SolverError> {
    let backup = backup_path(path);
    let backup_error = |source: io::Error| SolverError::Backup {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    };

    let mut src = File::open(path).map_err(backup_error)?;
    let mut dst = File::create(&backup).map_err(backup_error)?;
    let bytes = io::copy(&mut src, &mut dst).map_err(backup_error)?;

    log::debug!("Backed up {} ({} bytes) to {}", path.display(), bytes, backup.display());
    Ok(backup)
}

/// Put `<path>.bak` back in place of `path`.
pub fn restore_backup(path: &Path) -> Result<RestoreOutcome, RestoreError> {
    let backup = backup_path(path);

    if !backup.exists() {
        log::info!("No backup found for {}, skipping restore", path.display());
        return Ok(RestoreOutcome::NoBackup);
    }

    if path.exists() {
        fs::remove_file(path).map_err(|source| {
            log::error!("Error removing existing original {}: {}", path.display(), source);
            RestoreError::RemoveOriginal {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    fs::rename(&backup, path).map_err(|source| {
        log::error!("Error restoring backup {}: {}", backup.display(), source);
        RestoreError::Rename {
            backup: backup.clone(),
            path: path.to_path_buf(),
            source,
        }
    })?;

    // rename consumed the backup; anything still here is stale
    if backup.exists() && fs::remove_file(&backup).is_ok() {
        log::debug!("Removed leftover backup file: {}", backup.display());
    }

    log::info!("Restored {} from backup", path.display());
    Ok(RestoreOutcome::Restored)
}

/// Delete `<path>.bak` if present. Returns whether a file was removed.
pub fn remove_backup(path: &Path) -> io::Result<bool> {
    let backup = backup_path(path);
    match fs::remove_file(&backup) {
        Ok(()) => {
            log::debug!("Removed backup file: {}", backup.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/data/lights/m31.fits")),
            PathBuf::from("/data/lights/m31.fits.bak")
        );
        assert_eq!(backup_path(Path::new("m42.fit")), PathBuf::from("m42.fit.bak"));
    }

    #[test]
    fn test_create_backup_copies_content() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(&image, b"SIMPLE  =                    T").unwrap();

        let backup = create_backup(&image).unwrap();

        assert_eq!(backup, temp.path().join("m31.fits.bak"));
        assert_eq!(fs::read(&backup).unwrap(), b"SIMPLE  =                    T");
        assert!(image.exists());
    }

    #[test]
    fn test_create_backup_overwrites_previous() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(&image, b"new").unwrap();
        fs::write(backup_path(&image), b"stale and longer").unwrap();

        create_backup(&image).unwrap();

        assert_eq!(fs::read(backup_path(&image)).unwrap(), b"new");
    }

    #[test]
    fn test_create_backup_missing_source() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("missing.fits");

        let err = create_backup(&image).unwrap_err();

        assert!(matches!(err, SolverError::Backup { .. }));
        assert!(!backup_path(&image).exists());
    }

    #[test]
    fn test_restore_without_backup_is_noop() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(&image, b"modified").unwrap();

        assert_eq!(restore_backup(&image).unwrap(), RestoreOutcome::NoBackup);
        assert_eq!(fs::read(&image).unwrap(), b"modified");
    }

    #[test]
    fn test_restore_replaces_original() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(&image, b"original").unwrap();
        create_backup(&image).unwrap();
        fs::write(&image, b"half written by astap").unwrap();

        assert_eq!(restore_backup(&image).unwrap(), RestoreOutcome::Restored);
        assert_eq!(fs::read(&image).unwrap(), b"original");
        assert!(!backup_path(&image).exists());
    }

    #[test]
    fn test_restore_when_original_was_deleted() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(backup_path(&image), b"original").unwrap();

        assert_eq!(restore_backup(&image).unwrap(), RestoreOutcome::Restored);
        assert_eq!(fs::read(&image).unwrap(), b"original");
    }

    #[test]
    fn test_restore_aborts_when_original_cannot_be_removed() {
        let temp = TempDir::new().unwrap();
        // a directory where the image should be makes remove_file fail
        let image = temp.path().join("m31.fits");
        fs::create_dir(&image).unwrap();
        fs::write(backup_path(&image), b"original").unwrap();

        let err = restore_backup(&image).unwrap_err();

        assert!(matches!(err, RestoreError::RemoveOriginal { .. }));
        assert!(image.is_dir());
        assert_eq!(fs::read(backup_path(&image)).unwrap(), b"original");
    }

    #[test]
    fn test_remove_backup() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("m31.fits");
        fs::write(backup_path(&image), b"original").unwrap();

        assert!(remove_backup(&image).unwrap());
        assert!(!backup_path(&image).exists());
        assert!(!remove_backup(&image).unwrap());
    }
}
