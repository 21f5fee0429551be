use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use walkdir::WalkDir;

use crate::backup::{create_backup, remove_backup, restore_backup, RestoreOutcome};
use crate::config::{BackupPolicy, SolveOptions};
use crate::error::SolverError;
use crate::format::FitsExtension;

/// Handle on an ASTAP executable. The path is checked once, at construction.
#[derive(Debug, Clone)]
pub struct Solver {
    binary: PathBuf,
}

/// Progress notifications from a directory solve.
#[derive(Debug)]
pub enum SolveEvent<'a> {
    /// Emitted once, before the first file, with the number of eligible files.
    Found { total: usize },
    Solving { path: &'a Path },
    Solved { path: &'a Path },
    Failed { path: &'a Path, error: &'a SolverError },
}

/// Outcome of a directory solve.
#[derive(Debug, Default)]
pub struct DirectoryReport {
    pub solved: Vec<PathBuf>,
    /// Failed file → error message. Files not listed here were solved.
    pub failures: BTreeMap<PathBuf, String>,
}

impl DirectoryReport {
    pub fn total(&self) -> usize {
        self.solved.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl Solver {
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, SolverError> {
        let solver = Self {
            binary: binary.into(),
        };
        solver.verify_binary()?;
        log::debug!("Using ASTAP binary at {}", solver.binary.display());
        Ok(solver)
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Whether the configured binary is (still) on disk.
    pub fn binary_exists(&self) -> bool {
        self.verify_binary().is_ok()
    }

    /// Only existence is checked, not whether the file is executable.
    pub fn verify_binary(&self) -> Result<(), SolverError> {
        if self.binary.as_os_str().is_empty() {
            return Err(SolverError::EmptyBinaryPath);
        }
        match fs::metadata(&self.binary) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(SolverError::BinaryNotFound(self.binary.clone()))
            }
            _ => Ok(()),
        }
    }

    /// The ASTAP invocation for one image: `-f <image> -update -wcs`.
    pub fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-f").arg(image);
        cmd.arg("-update"); // write the solution into the FITS header in place
        cmd.arg("-wcs"); // and a .wcs sidecar
        cmd
    }

    pub fn solve(&self, image: &Path, disable_backups: bool) -> Result<(), SolverError> {
        self.solve_with(image, &SolveOptions::with_backups_disabled(disable_backups))
    }

    /// Solve one image in place.
    ///
    /// With backups enabled the file is copied to `<image>.bak` first, and put
    /// back if ASTAP fails. A failed restore is logged and does not change the
    /// returned error.
    pub fn solve_with(&self, image: &Path, options: &SolveOptions) -> Result<(), SolverError> {
        let backed_up = !options.disable_backups;
        if backed_up {
            create_backup(image)?;
        }

        let mut cmd = self.command(image);
        log::debug!(
            "Executing: {} {:?}",
            self.binary.display(),
            cmd.get_args().collect::<Vec<_>>()
        );

        let output = match cmd.output() {
            Ok(output) => output,
            Err(source) => {
                log::error!("Failed to execute {}: {}", self.binary.display(), source);
                if backed_up {
                    restore_after_failure(image);
                }
                return Err(SolverError::Launch {
                    binary: self.binary.clone(),
                    source,
                });
            }
        };

        if !output.status.success() {
            let message = failure_message(&output);
            log::error!("ASTAP failed on {}: {}", image.display(), message.trim_end());
            if backed_up {
                restore_after_failure(image);
            }
            return Err(SolverError::Solve {
                path: image.to_path_buf(),
                status: output.status.code(),
                output: message,
            });
        }

        log::info!("Solved {}", image.display());

        if backed_up && options.backup_policy == BackupPolicy::RemoveOnSuccess {
            if let Err(e) = remove_backup(image) {
                log::warn!("Could not remove backup of {}: {}", image.display(), e);
            }
        }

        Ok(())
    }

    /// FITS files directly inside `dir`, sorted by file name.
    ///
    /// Subdirectories are skipped and never descended into. Links are not
    /// followed, so a `.fits` symlink is listed even when its target is gone
    /// and the failure shows up when it is solved. Only a failure to read `dir`
    /// itself is an error.
    pub fn eligible_files(&self, dir: &Path) -> Result<Vec<PathBuf>, SolverError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(SolverError::ReadDirectory {
                        path: dir.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.into_path();
            if FitsExtension::from_path(&path).is_none() {
                log::debug!("Skipping non-FITS file {}", path.display());
                continue;
            }
            files.push(path);
        }

        Ok(files)
    }

    pub fn solve_directory(
        &self,
        dir: &Path,
        disable_backups: bool,
    ) -> Result<DirectoryReport, SolverError> {
        self.solve_directory_with(
            dir,
            &SolveOptions::with_backups_disabled(disable_backups),
            |_| {},
        )
    }

    /// Solve every eligible file in `dir`, one after another.
    ///
    /// A failing file is recorded in [`DirectoryReport::failures`] and the
    /// batch carries on. The only hard error is not being able to list `dir`.
    pub fn solve_directory_with<F>(
        &self,
        dir: &Path,
        options: &SolveOptions,
        mut on_event: F,
    ) -> Result<DirectoryReport, SolverError>
    where
        F: FnMut(SolveEvent<'_>),
    {
        let files = self.eligible_files(dir)?;
        log::info!("Found {} FITS file(s) in {}", files.len(), dir.display());
        on_event(SolveEvent::Found { total: files.len() });

        let mut report = DirectoryReport::default();
        for path in files {
            on_event(SolveEvent::Solving { path: &path });
            match self.solve_with(&path, options) {
                Ok(()) => {
                    on_event(SolveEvent::Solved { path: &path });
                    report.solved.push(path);
                }
                Err(error) => {
                    on_event(SolveEvent::Failed {
                        path: &path,
                        error: &error,
                    });
                    report.failures.insert(path, error.to_string());
                }
            }
        }

        Ok(report)
    }
}

fn restore_after_failure(image: &Path) {
    match restore_backup(image) {
        Ok(RestoreOutcome::Restored) => {}
        Ok(RestoreOutcome::NoBackup) => {
            log::warn!("Backup of {} disappeared before it could be restored", image.display());
        }
        Err(e) => log::warn!("Could not restore {}: {}", image.display(), e),
    }
}

/// stdout followed by stderr, or a status line when ASTAP printed nothing.
fn failure_message(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !combined.trim().is_empty() {
        return combined;
    }
    match output.status.code() {
        Some(code) => format!("ASTAP exited with status {code}"),
        None => "ASTAP was terminated by a signal".to_string(),
    }
}
