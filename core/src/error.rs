use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("ASTAP binary path is not set")]
    EmptyBinaryPath,

    #[error("ASTAP binary not found at path: {0}")]
    BinaryNotFound(PathBuf),

    #[error("failed to create backup {backup} of {path}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: PathBuf,
        source: std::io::Error,
    },

    /// ASTAP ran but exited unsuccessfully. `output` is everything it wrote to
    /// stdout followed by everything it wrote to stderr; the two streams are
    /// captured separately, so lines are not interleaved in print order.
    #[error("{output}")]
    Solve {
        path: PathBuf,
        status: Option<i32>,
        output: String,
    },

    #[error("failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl SolverError {
    /// True for errors raised while validating the configured binary.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::EmptyBinaryPath | Self::BinaryNotFound(_))
    }
}

/// Failures while putting a `.bak` file back. These are only ever logged by
/// the solve path; the CLI `restore` command reports them directly.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("failed to remove existing original {path}: {source}")]
    RemoveOriginal {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to rename {backup} to {path}: {source}")]
    Rename {
        backup: PathBuf,
        path: PathBuf,
        source: std::io::Error,
    },
}
